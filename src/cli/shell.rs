//! Line-oriented front end: the interactive editor and the stdin script runner
//! both feed [`handle_line`].

use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::config::Config;
use crate::domain::ExpenseCategory;

/// Runs the shell. Setting `TRIP_CORE_CLI_SCRIPT` reads commands from stdin
/// without prompts.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os("TRIP_CORE_CLI_SCRIPT").is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    let result = match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    };
    tracing::debug!(status = %context.status(), "shell stopped");
    result
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<TripHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(TripHelper::for_context(context)));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    output_info("Trip planner ready. Type `help` for commands.");

    while context.running {
        // The prompt carries the selected day, so it is rebuilt every turn.
        let prompt = context.prompt();
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if run_line(context, trimmed)? == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Blank lines and `#` comments are skipped so scripts can be annotated.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if run_line(context, trimmed)? == LoopControl::Exit || !context.running {
            break;
        }
    }
    Ok(())
}

fn run_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match handle_line(context, line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

/// Tokenizes one line and dispatches it. Quoted notes stay one argument.
pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = shell_words::split(line).map_err(|err| {
        CommandError::InvalidArguments(format!("cannot read `{}`: {}", line.trim(), err))
    })?;
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };

    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.last_command = Some(line.trim().to_string());

    let control = context.dispatch(&command, raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Completion and argument hints that know the trip's commands, currencies,
/// categories and day count.
struct TripHelper {
    /// `(name, argument usage)` sorted by name.
    commands: Vec<(String, String)>,
    currencies: Vec<String>,
    day_count: usize,
}

impl TripHelper {
    fn for_context(context: &ShellContext) -> Self {
        let pair = &context.config.currencies;
        let commands = context
            .registry
            .list()
            .into_iter()
            .map(|entry| (entry.name, entry.usage));
        Self::new(
            commands,
            [pair.primary.as_str(), pair.secondary.as_str()],
            context.controller.itinerary().len(),
        )
    }

    fn new<'a>(
        commands: impl IntoIterator<Item = (&'a str, &'a str)>,
        codes: [&str; 2],
        day_count: usize,
    ) -> Self {
        let mut commands: Vec<(String, String)> = commands
            .into_iter()
            .map(|(name, usage)| {
                let name = name.to_ascii_lowercase();
                let arguments = usage
                    .strip_prefix(name.as_str())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                (name, arguments)
            })
            .collect();
        commands.sort_by(|a, b| a.0.cmp(&b.0));
        commands.dedup_by(|a, b| a.0 == b.0);

        let mut currencies = vec!["primary".to_string(), "secondary".to_string()];
        currencies.extend(codes.iter().map(|code| code.to_ascii_lowercase()));

        Self {
            commands,
            currencies,
            day_count,
        }
    }

    fn command_names(&self) -> Vec<String> {
        self.commands.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Values that fit the word after `words`.
    fn candidates(&self, words: &[&str]) -> Vec<String> {
        let Some((first, rest)) = words.split_first() else {
            return self.command_names();
        };
        match (first.to_ascii_lowercase().as_str(), rest.len()) {
            ("add", 1) => self.currencies.clone(),
            ("add", 2) => ExpenseCategory::ALL
                .iter()
                .map(ToString::to_string)
                .collect(),
            ("day", 0) => (1..=self.day_count).map(|n| n.to_string()).collect(),
            ("help", 0) => self.command_names(),
            ("config", 0) => ["show", "set"]
                .into_iter()
                .chain(Config::FIELDS)
                .map(String::from)
                .collect(),
            ("config", 1) if rest[0].eq_ignore_ascii_case("set") => {
                Config::FIELDS.into_iter().map(String::from).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Start of the word being typed and the candidates that extend it.
    fn matches(&self, prefix: &str) -> (usize, Vec<String>) {
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let words: Vec<&str> = prefix[..start].split_whitespace().collect();
        let needle = prefix[start..].to_ascii_lowercase();
        let matches = self
            .candidates(&words)
            .into_iter()
            .filter(|candidate| candidate.starts_with(&needle))
            .collect();
        (start, matches)
    }

    fn arguments_for(&self, command: &str) -> Option<&str> {
        self.commands
            .iter()
            .find(|(name, _)| name == command)
            .map(|(_, arguments)| arguments.as_str())
            .filter(|arguments| !arguments.is_empty())
    }
}

impl Helper for TripHelper {}

impl Completer for TripHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.matches(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for TripHelper {
    type Hint = String;

    /// After `<command> ` shows the arguments still to type.
    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos != line.len() || !line.ends_with(' ') {
            return None;
        }
        let mut words = line.split_whitespace();
        let command = words.next()?.to_ascii_lowercase();
        if words.next().is_some() {
            return None;
        }
        self.arguments_for(&command).map(String::from)
    }
}

impl Highlighter for TripHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for TripHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> TripHelper {
        TripHelper::new(
            [
                ("weather", "weather"),
                ("add", "add <amount> <primary|secondary> <category> [note...]"),
                ("Add", "add"),
                ("day", "day <n>"),
                ("help", "help [command]"),
                ("config", "config [show | [set] <key> <value>]"),
            ],
            ["TWD", "JPY"],
            4,
        )
    }

    fn complete(helper: &TripHelper, line: &str) -> Vec<String> {
        helper.matches(line).1
    }

    #[test]
    fn command_names_are_sorted_and_unique() {
        assert_eq!(
            helper().command_names(),
            vec!["add", "config", "day", "help", "weather"]
        );
    }

    #[test]
    fn add_completes_currency_then_category() {
        let helper = helper();
        assert_eq!(complete(&helper, "add 800 "), vec!["primary", "secondary", "twd", "jpy"]);
        assert_eq!(complete(&helper, "add 800 j"), vec!["jpy"]);
        assert_eq!(complete(&helper, "add 800 jpy s"), vec!["shopping", "stay"]);
        assert!(complete(&helper, "add 800 jpy food ").is_empty());
    }

    #[test]
    fn day_completes_trip_day_numbers() {
        assert_eq!(complete(&helper(), "day "), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn config_set_completes_setting_keys() {
        let keys = complete(&helper(), "config set fall");
        assert_eq!(keys, vec!["fallback_rate"]);
        assert!(complete(&helper(), "config s").contains(&"set".to_string()));
    }

    #[test]
    fn hints_show_remaining_arguments() {
        let helper = helper();
        assert_eq!(
            helper.arguments_for("add"),
            Some("<amount> <primary|secondary> <category> [note...]")
        );
        assert_eq!(helper.arguments_for("day"), Some("<n>"));
        assert_eq!(helper.arguments_for("weather"), None);
    }
}
