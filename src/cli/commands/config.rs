use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{detail, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::config::Config;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View or change saved preferences",
        "config [show | [set] <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        show_config(context);
        return Ok(());
    }

    let rest = if args[0].eq_ignore_ascii_case("set") {
        &args[1..]
    } else {
        args
    };
    if rest.len() < 2 {
        return Err(CommandError::InvalidArguments(format!(
            "usage: config set <key> <value> (keys: {})",
            Config::FIELDS.join(", ")
        )));
    }

    let key = rest[0].to_lowercase();
    let value = rest[1..].join(" ");
    context.config.set_field(&key, &value)?;
    context.persist_config()?;
    tracing::info!(key = %key, "config updated");
    io::print_success(format!("{} set to {}.", key, value.trim()));
    io::print_info("Restart the shell for provider and storage settings to take effect.");
    Ok(())
}

fn show_config(context: &ShellContext) {
    output_section("Configuration");
    for key in Config::FIELDS {
        if let Some(value) = context.config.field(key) {
            detail(format!("  {:<20} {}", key, value));
        }
    }
    detail(format!(
        "  {:<20} {}",
        "file",
        context.config_manager.config_path().display()
    ));
}
