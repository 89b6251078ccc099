use chrono::{Local, Utc};
use colored::Colorize;

use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{detail, section as output_section, separator};
use crate::cli::registry::CommandEntry;
use crate::core::services::ExpenseAggregator;
use crate::currency::{
    format_currency_value, format_rounded, minor_units_for, Currency, CurrencyCode,
};
use crate::domain::{Displayable, ExpenseCategory, ExpenseDraft, ExpenseRecord, Identifiable};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Log an expense",
            "add <amount> <primary|secondary> <category> [note...]",
            cmd_add,
        ),
        CommandEntry::new(
            "remove",
            "Delete an expense by id or id prefix",
            "remove <id>",
            cmd_remove,
        ),
        CommandEntry::new("expenses", "List logged expenses", "expenses", cmd_expenses),
        CommandEntry::new(
            "summary",
            "Show the total and the per-category breakdown",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new("rate", "Show the exchange rate in use", "rate", cmd_rate),
        CommandEntry::new("legend", "Show category colours", "legend", cmd_legend),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::InvalidArguments(
            "usage: add <amount> <primary|secondary> <category> [note...]".into(),
        ));
    }
    let amount = ExpenseAggregator::parse_amount(args[0])?;
    let currency = Currency::parse(args[1], &context.config.currencies)?;
    let category = ExpenseCategory::parse(args[2])?;
    let draft = ExpenseDraft::new(amount, currency, category).with_note(args[3..].join(" "));

    let record = context.controller.add_expense(draft, Utc::now())?;
    let code = context.config.currencies.code(record.currency);
    io::print_success(format!(
        "Added {} {} ({}).",
        short_id(&record.id),
        money(record.amount, code),
        record.category
    ));
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let needle = args
        .first()
        .map(|arg| arg.trim())
        .filter(|arg| !arg.is_empty())
        .ok_or_else(|| CommandError::InvalidArguments("usage: remove <id>".into()))?;

    let matches: Vec<&ExpenseRecord> = match context.controller.find_expense(needle) {
        Some(exact) => vec![exact],
        None => context
            .controller
            .expenses()
            .iter()
            .filter(|record| record.id().starts_with(needle))
            .collect(),
    };
    let record = match matches.as_slice() {
        [] => {
            io::print_warning(format!("No expense with id `{}`.", needle));
            return Ok(());
        }
        [record] => (*record).clone(),
        _ => {
            return Err(CommandError::InvalidArguments(format!(
                "`{}` matches {} expenses; use more of the id",
                needle,
                matches.len()
            )))
        }
    };

    let code = context.config.currencies.code(record.currency);
    let prompt = format!(
        "Delete {} {} ({})?",
        short_id(&record.id),
        money(record.amount, code),
        record.category
    );
    if !context.confirm(&prompt)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    if context.controller.remove_expense(&record.id)? {
        io::print_success(format!("Removed {}.", short_id(&record.id)));
    }
    Ok(())
}

fn cmd_expenses(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let records = context.controller.expenses();
    if records.is_empty() {
        io::print_info("No expenses logged yet.");
        return Ok(());
    }
    let rate = context.controller.rate();
    let pair = &context.config.currencies;

    output_section(format!("Expenses ({})", records.len()));
    for record in records {
        let code = pair.code(record.currency);
        let other = pair.code(record.currency.other());
        let equivalent =
            ExpenseAggregator::secondary_equivalent(record.amount, record.currency, &rate);
        let when = record.created_at.with_timezone(&Local).format("%m/%d %H:%M");
        detail(format!(
            "  {}  {}  {:>12}  ≈ {:<12} {}",
            short_id(&record.id),
            when,
            money(record.amount, code),
            format_rounded(equivalent, other),
            record.display_label()
        ));
    }
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.controller.summary();
    let primary = &context.config.currencies.primary;

    output_section("Spending summary");
    detail(format!(
        "  Total: {} across {} expense(s)",
        format_rounded(summary.total, primary),
        summary.record_count
    ));
    if summary.breakdown.is_empty() {
        return Ok(());
    }
    separator();
    for row in &summary.breakdown {
        detail(format!(
            "  {} {:<10} {:>12}  {:>5.1}%",
            swatch(row.category),
            row.category,
            format_rounded(row.amount, primary),
            row.share_percent
        ));
    }
    detail(format!("  {}", rate_line(context)));
    Ok(())
}

fn cmd_rate(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    io::print_info(rate_line(context));
    Ok(())
}

fn cmd_legend(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Categories");
    for category in ExpenseCategory::ALL {
        detail(format!(
            "  {} {:<10} {}",
            swatch(category),
            category,
            category.color_hex()
        ));
    }
    Ok(())
}

fn rate_line(context: &ShellContext) -> String {
    let rate = context.controller.rate();
    let pair = &context.config.currencies;
    format!(
        "1 {} = {} {} ({} rate)",
        pair.secondary,
        rate.secondary_to_primary(),
        pair.primary,
        rate.source()
    )
}

/// Entered amounts keep their decimals only when they have any.
fn money(amount: f64, code: &CurrencyCode) -> String {
    let precision = if amount.fract() == 0.0 {
        0
    } else {
        minor_units_for(code.as_str())
    };
    format_currency_value(amount, code, precision)
}

fn swatch(category: ExpenseCategory) -> String {
    let hex = category.color_hex().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
            .unwrap_or(0)
    };
    "■".truecolor(channel(0..2), channel(2..4), channel(4..6)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_drops_zero_decimals() {
        let twd = CurrencyCode::new("TWD");
        assert_eq!(money(1200.0, &twd), "NT$ 1,200");
        assert_eq!(money(12.5, &twd), "NT$ 12.50");
        assert_eq!(money(980.0, &CurrencyCode::new("JPY")), "¥ 980");
    }
}
