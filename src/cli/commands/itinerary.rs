use crate::cli::core::{parse_day_number, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{detail, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::domain::{DaySchedule, Displayable};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("days", "List the days of the trip", "days", cmd_days),
        CommandEntry::new(
            "day",
            "Select a day and fetch its forecasts",
            "day <number>",
            cmd_day,
        ),
        CommandEntry::new(
            "itinerary",
            "Show the selected day's schedule",
            "itinerary",
            cmd_itinerary,
        ),
    ]
}

fn cmd_days(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let itinerary = context.controller.itinerary();
    if itinerary.is_empty() {
        io::print_warning("The itinerary has no days.");
        return Ok(());
    }
    output_section("Trip days");
    let selected = context.controller.selected_index();
    for (index, day) in itinerary.days.iter().enumerate() {
        let marker = if index == selected { "*" } else { " " };
        detail(format!("{} {}. {}", marker, index + 1, day.display_label()));
    }
    Ok(())
}

fn cmd_day(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let input = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: day <number>".into()))?;
    let index = parse_day_number(input, context.controller.itinerary().len())?;
    let requested = context.select_day(index)?;

    if let Some(day) = context.controller.selected_day() {
        io::print_success(format!("Selected {}.", day.display_label()));
    }
    if requested > 0 && !context.is_offline() {
        io::print_info(format!(
            "Fetching forecasts for {} location(s). Use `weather` to view them.",
            requested
        ));
    }
    Ok(())
}

fn cmd_itinerary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Some(day) = context.controller.selected_day() else {
        io::print_warning("No day selected.");
        return Ok(());
    };
    print_schedule(day);
    Ok(())
}

fn print_schedule(day: &DaySchedule) {
    output_section(day.display_label());
    if day.events.is_empty() {
        detail("  (nothing planned)");
    }
    for event in &day.events {
        let place = event
            .location
            .as_deref()
            .map(|location| format!("  @ {}", location))
            .unwrap_or_default();
        detail(format!(
            "  {}  {:<11} {}{}",
            event.time,
            event.kind.to_string(),
            event.title,
            place
        ));
        if !event.description.is_empty() {
            detail(format!("         {}", event.description));
        }
    }
    let names: Vec<&str> = day
        .weather_locations
        .iter()
        .map(|location| location.name.as_str())
        .collect();
    if !names.is_empty() {
        detail(format!("  Weather for: {}", names.join(", ")));
    }
}
