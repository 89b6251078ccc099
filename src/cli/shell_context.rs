use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
};

use crate::{
    config::{Config, ConfigManager},
    core::{AppController, AppMessage},
    providers::{ExchangeRateProvider, ForecastProvider},
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can reach. Providers are absent in offline
/// mode.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub controller: AppController,
    pub(crate) runtime: Runtime,
    pub(crate) forecast_provider: Option<Arc<dyn ForecastProvider>>,
    pub(crate) rate_provider: Option<Arc<dyn ExchangeRateProvider>>,
    pub(crate) sender: UnboundedSender<AppMessage>,
    pub(crate) receiver: UnboundedReceiver<AppMessage>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn is_offline(&self) -> bool {
        self.forecast_provider.is_none()
    }

    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, day: {}, generation: {} }}",
            self.running,
            self.last_command,
            self.controller.selected_index() + 1,
            self.controller.generation()
        )
    }
}
