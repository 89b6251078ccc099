//! Core CLI loop, dispatch, and shell context helpers.

use std::{
    fs, io,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{Local, NaiveDate};
use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use tokio::sync::mpsc;

use crate::{
    config::{Config, ConfigManager},
    core::{AppController, ExpenseBook, ForecastRequest},
    currency::ExchangeRate,
    domain::Itinerary,
    errors::TripError,
    providers::{self, ExchangeRateApiClient, OpenMeteoClient},
    storage::JsonFileStore,
    utils::{paths, persistence},
};

pub use crate::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, &paths::app_data_dir())
    }

    pub fn with_base_dir(mode: CliMode, base: &Path) -> Result<Self, CliError> {
        fs::create_dir_all(base).map_err(TripError::from)?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?.with_env_overrides();
        output::set_preferences(OutputPreferences {
            color_enabled: config.ui_color_enabled,
            quiet_mode: mode == CliMode::Script,
        });

        let store = Arc::new(JsonFileStore::in_dir(base)?);
        let expenses = ExpenseBook::open(store, config.expense_key.clone());
        let itinerary = load_itinerary(&config);
        let controller = AppController::new(
            itinerary,
            expenses,
            ExchangeRate::fallback(config.fallback_rate),
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(TripError::from)?;

        let (forecast_provider, rate_provider) = if config.offline {
            tracing::info!("offline mode; remote providers disabled");
            (None, None)
        } else {
            let forecast: Arc<dyn providers::ForecastProvider> =
                Arc::new(OpenMeteoClient::new(&config)?);
            let rate: Arc<dyn providers::ExchangeRateProvider> =
                Arc::new(ExchangeRateApiClient::new(&config)?);
            (Some(forecast), Some(rate))
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        let mut context = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            controller,
            runtime,
            forecast_provider,
            rate_provider,
            sender,
            receiver,
            last_command: None,
            running: true,
        };

        context.request_rate();
        if !context.controller.itinerary().is_empty() {
            let index = context.controller.initial_day_index(today());
            context.select_day(index)?;
        }
        Ok(context)
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        match self.controller.selected_day() {
            Some(day) => format!("trip [{} {}]> ", day.display_date, day.day_of_week),
            None => "trip> ".into(),
        }
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager
            .save(&self.config)
            .map_err(CommandError::from)
    }

    /// Selects a day and starts fetching its forecasts in the background.
    pub(crate) fn select_day(&mut self, index: usize) -> Result<usize, TripError> {
        let requests = self.controller.select_day(index)?;
        let count = requests.len();
        self.dispatch_forecasts(requests);
        Ok(count)
    }

    pub(crate) fn refresh_forecasts(&mut self) -> usize {
        let requests = self.controller.refresh();
        let count = requests.len();
        self.dispatch_forecasts(requests);
        count
    }

    fn dispatch_forecasts(&self, requests: Vec<ForecastRequest>) {
        let Some(provider) = &self.forecast_provider else {
            return;
        };
        let _guard = self.runtime.enter();
        providers::fetch_forecasts(Arc::clone(provider), requests, self.sender.clone());
    }

    fn request_rate(&self) {
        let Some(provider) = self.rate_provider.clone() else {
            return;
        };
        let pair = self.config.currencies.clone();
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let message = providers::fetch_rate(provider.as_ref(), &pair).await;
            if sender.send(message).is_err() {
                tracing::debug!("rate receiver closed before delivery");
            }
        });
    }

    /// Applies every result that has already arrived.
    pub(crate) fn drain_messages(&mut self) {
        while let Ok(message) = self.receiver.try_recv() {
            self.controller.apply(message);
        }
    }

    /// Blocks until the selected day has no pending forecasts or the request
    /// timeout has passed.
    pub(crate) fn await_forecasts(&mut self) {
        self.drain_messages();
        if self.forecast_provider.is_none() || !self.controller.has_pending_forecasts() {
            return;
        }
        let wait = Duration::from_secs(self.config.http_timeout_secs.saturating_add(1));
        let started = Instant::now();
        let Self {
            runtime,
            receiver,
            controller,
            ..
        } = self;
        runtime.block_on(async {
            while controller.has_pending_forecasts() {
                let remaining = wait.saturating_sub(started.elapsed());
                match tokio::time::timeout(remaining, receiver.recv()).await {
                    Ok(Some(message)) => controller.apply(message),
                    Ok(None) | Err(_) => break,
                }
            }
        });
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        self.drain_messages();
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    /// Script mode never prompts and answers yes.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        self.confirm("Exit shell?").map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(TripError::InvalidInput(message)) => {
                self.print_error(&message);
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A configured itinerary file that cannot be read falls back to the
/// built-in trip with a warning.
fn load_itinerary(config: &Config) -> Itinerary {
    let Some(path) = &config.itinerary_path else {
        return Itinerary::builtin();
    };
    match persistence::load_json::<Itinerary>(path) {
        Ok(itinerary) => {
            tracing::info!(path = %path.display(), days = itinerary.len(), "itinerary loaded");
            itinerary
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "itinerary unreadable; using built-in trip");
            cli_io::print_warning(format!(
                "Could not read itinerary {}: {}. Using the built-in trip.",
                path.display(),
                err
            ));
            Itinerary::builtin()
        }
    }
}

pub(crate) fn parse_day_number(input: &str, days: usize) -> Result<usize, CommandError> {
    let number: usize = input.trim().parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not a day number", input))
    })?;
    if number == 0 || number > days {
        return Err(CommandError::InvalidArguments(format!(
            "day must be between 1 and {}",
            days
        )));
    }
    Ok(number - 1)
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] TripError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Input(message) => CommandError::InvalidArguments(message),
            CliError::Command(message) => CommandError::Message(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::InvalidArguments(message) => CliError::Input(message),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(base: &Path, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base)?;
    for line in lines {
        match super::shell::handle_line(&mut app, line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::shell::handle_line;
    use tempfile::tempdir;

    fn offline_home() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let config = Config {
            offline: true,
            ..Config::default()
        };
        ConfigManager::with_base_dir(dir.path())
            .unwrap()
            .save(&config)
            .unwrap();
        dir
    }

    #[test]
    fn script_adds_and_removes_expenses() {
        let home = offline_home();
        let app = process_script(
            home.path(),
            &["add 1200 secondary food ramen", "add 300 primary transport"],
        )
        .unwrap();
        assert_eq!(app.controller.expenses().len(), 2);
        assert_eq!(app.controller.expenses()[1].note, "ramen");

        let id = app.controller.expenses()[0].id.clone();
        drop(app);
        let app = process_script(home.path(), &[format!("remove {}", id).as_str()]).unwrap();
        assert_eq!(app.controller.expenses().len(), 1);
    }

    #[test]
    fn day_command_switches_selection() {
        let home = offline_home();
        let app = process_script(home.path(), &["day 3"]).unwrap();
        assert_eq!(app.controller.selected_index(), 2);
        assert!(app.prompt().contains("3/13"));
    }

    #[test]
    fn invalid_arguments_are_reported_not_fatal() {
        let home = offline_home();
        let mut app = ShellContext::with_base_dir(CliMode::Script, home.path()).unwrap();
        assert!(matches!(
            handle_line(&mut app, "day 9"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(handle_line(&mut app, "add -5 primary food").is_err());
        assert!(app.controller.expenses().is_empty());
        assert!(matches!(
            handle_line(&mut app, r#"add 800 secondary food "blue seal"#),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(app.controller.expenses().is_empty());
        assert!(app.running);
        assert_eq!(handle_line(&mut app, "exit").unwrap(), LoopControl::Exit);
        assert!(!app.running);
    }

    #[test]
    fn quoted_notes_reach_the_expense() {
        let home = offline_home();
        let line = r#"add 800 secondary food "blue seal ice cream""#;
        let app = process_script(home.path(), &[line]).unwrap();
        assert_eq!(app.controller.expenses()[0].note, "blue seal ice cream");
        assert_eq!(app.last_command.as_deref(), Some(line));
    }

    #[test]
    fn empty_remove_id_is_rejected() {
        let home = offline_home();
        let mut app = process_script(home.path(), &["add 300 primary transport"]).unwrap();
        assert!(matches!(
            handle_line(&mut app, r#"remove """#),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            handle_line(&mut app, r#"remove "  ""#),
            Err(CommandError::InvalidArguments(_))
        ));
        assert_eq!(app.controller.expenses().len(), 1);
    }

    #[test]
    fn parse_day_number_is_one_based() {
        assert_eq!(parse_day_number("1", 4).unwrap(), 0);
        assert_eq!(parse_day_number("4", 4).unwrap(), 3);
        assert!(parse_day_number("0", 4).is_err());
        assert!(parse_day_number("five", 4).is_err());
    }
}
