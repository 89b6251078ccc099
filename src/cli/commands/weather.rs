use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{detail, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::core::ForecastSlot;
use crate::domain::LocationForecastWindow;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "weather",
            "Show the remaining hours of today's forecast",
            "weather",
            cmd_weather,
        ),
        CommandEntry::new(
            "refresh",
            "Fetch the selected day's forecasts again",
            "refresh",
            cmd_refresh,
        ),
    ]
}

fn cmd_weather(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.await_forecasts();
    let windows = context.controller.forecast_windows();
    if windows.is_empty() {
        io::print_info("No weather locations for this day.");
        return Ok(());
    }
    for window in &windows {
        output_section(&window.location_name);
        if context.is_offline() {
            detail("  offline: forecasts disabled");
            continue;
        }
        match context.controller.slot(&window.location_name) {
            Some(ForecastSlot::Failed) => detail("  forecast unavailable"),
            _ if window.is_loading() => detail("  loading..."),
            _ => print_window(window),
        }
    }
    Ok(())
}

fn print_window(window: &LocationForecastWindow) {
    for point in &window.points {
        detail(format!(
            "  {}  {:>3}°C  {} {}",
            point.hour_label,
            point.temperature_celsius,
            point.icon.glyph(),
            point.icon
        ));
    }
}

fn cmd_refresh(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.is_offline() {
        io::print_warning("Offline mode is on; nothing to refresh.");
        return Ok(());
    }
    let count = context.refresh_forecasts();
    io::print_info(format!("Refreshing {} location(s).", count));
    Ok(())
}
