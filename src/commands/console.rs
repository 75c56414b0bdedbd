//! Console front end - reads one command per line and prints the results.
//!
//! Fields of `add` and `edit` are separated by `|` so names and notes may
//! contain spaces:
//!
//! ```text
//! add Kim Minsu | 5 | 2 | friend | college roommate
//! edit 3 | Kim Minsu | 50,000 | 2 | friend | college roommate
//! ```
//!
//! Destructive commands and duplicate names ask for a `y`/`n` answer on the
//! next line before anything is changed.

use super::{Command, Response, dispatch};
use crate::{
    config::Settings,
    core::{Dashboard, LedgerService, RecordDraft},
    entities::{Category, RecordModel},
    errors::{Error, Result},
};
use std::io::{BufRead, Lines, Write};
use tracing::error;

/// Usage text shown at startup and by `help`.
pub const HELP_TEXT: &str = "Commands:\n\
    \x20 add NAME | AMOUNT | [MEAL] | [CATEGORY] | [NOTE]   register a contribution (1-1000 means x10,000)\n\
    \x20 edit ID | NAME | AMOUNT | [MEAL] | [CATEGORY] | [NOTE]   change a record\n\
    \x20 remove ID                                         delete a record\n\
    \x20 reset                                             delete every record\n\
    \x20 dashboard                                         show totals\n\
    \x20 list                                              show all records\n\
    \x20 search TEXT                                       show records whose name contains TEXT\n\
    \x20 export                                            write the ledger workbook\n\
    \x20 help                                              show this text\n\
    \x20 quit                                              leave\n\
    Categories: Friend, Relative, Workplace, Family, Acquaintance, Other";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Something to dispatch
    Command(Command),
    /// Leave the console
    Quit,
    /// Nothing typed
    Blank,
}

fn command_error(message: impl Into<String>) -> Error {
    Error::Command {
        message: message.into(),
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| command_error(format!("record id must be a number, got {raw:?}")))
}

/// Builds a draft from `NAME | AMOUNT | [MEAL] | [CATEGORY] | [NOTE]` fields.
fn parse_draft<'a>(mut fields: impl Iterator<Item = &'a str>) -> Result<RecordDraft> {
    let mut next = || fields.next().map(str::trim).unwrap_or_default().to_string();
    let name = next();
    let amount = next();
    let meal_ticket = next();
    let category = next();
    let note = next();

    let category = if category.is_empty() {
        Category::default()
    } else {
        category.parse::<Category>()?
    };

    Ok(RecordDraft {
        name,
        amount,
        meal_ticket,
        category,
        note,
    })
}

/// Parses one console line.
pub fn parse_line(line: &str) -> Result<Input> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Blank);
    }

    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    let command = match verb.to_ascii_lowercase().as_str() {
        "quit" | "exit" => return Ok(Input::Quit),
        "add" => Command::Add(parse_draft(rest.split('|'))?),
        "edit" => {
            let mut fields = rest.split('|');
            let id = parse_id(fields.next().unwrap_or_default())?;
            Command::Edit {
                id,
                draft: parse_draft(fields)?,
            }
        }
        "remove" | "delete" => Command::Remove { id: parse_id(rest)? },
        "reset" => Command::ResetAll,
        "dashboard" | "summary" => Command::Dashboard,
        "list" => Command::List,
        "search" => Command::Search {
            query: rest.to_string(),
        },
        "export" => Command::Export,
        "help" => Command::Help,
        other => return Err(command_error(format!("unknown command {other:?}, try help"))),
    };
    Ok(Input::Command(command))
}

/// Formats an amount with `,` thousands separators.
#[must_use]
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn render_dashboard(dashboard: &Dashboard) -> String {
    format!(
        "Contributors: {} | Total: {} | Average: {} | Meal tickets: {}",
        dashboard.count,
        format_amount(dashboard.total_amount),
        format_amount(dashboard.average),
        dashboard.total_meal_tickets
    )
}

/// One table line per record. `No` counts down to 1; `ID` is what `edit` and
/// `remove` take.
fn render_records(records: &[RecordModel]) -> String {
    if records.is_empty() {
        return "No records.".to_string();
    }
    let mut lines = vec![format!(
        "{:>4}  {:>4}  {:<16} {:>14}  {:>4}  {:<12}  {:<19}  {}",
        "No", "ID", "Name", "Amount", "Meal", "Category", "CreatedAt", "Note"
    )];
    let total = records.len();
    lines.extend(records.iter().enumerate().map(|(index, record)| {
        format!(
            "{:>4}  {:>4}  {:<16} {:>14}  {:>4}  {:<12}  {:<19}  {}",
            total - index,
            record.id,
            record.name,
            format_amount(record.amount),
            record.meal_ticket,
            record.category.label(),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.note
        )
    }));
    lines.join("\n")
}

/// Renders a response for the console.
#[must_use]
pub fn render_response(response: &Response) -> String {
    match response {
        Response::Added(record) => format!(
            "Registered #{} {}: {} ({} meal tickets, {})",
            record.id,
            record.name,
            format_amount(record.amount),
            record.meal_ticket,
            record.category
        ),
        Response::Duplicate(pending) => {
            format!("'{}' is already registered.", pending.fields().name)
        }
        Response::Edited(record) => format!("Updated record {}.", record.id),
        Response::Removed { id, removed: true } => format!("Deleted record {id}."),
        Response::Removed { id, removed: false } => format!("There is no record {id}."),
        Response::Reset { removed } => format!("Ledger reset, {removed} records deleted."),
        Response::Dashboard(dashboard) => render_dashboard(dashboard),
        Response::Records(records) => render_records(records),
        Response::Exported(path) => format!("Saved {}", path.display()),
        Response::Help => HELP_TEXT.to_string(),
    }
}

fn confirm<R, W>(lines: &mut Lines<R>, output: &mut W, prompt: &str) -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{prompt} (y/n) ")?;
    output.flush()?;
    let answer = match lines.next() {
        Some(line) => line?,
        None => return Ok(false),
    };
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

const fn changes_ledger(response: &Response) -> bool {
    matches!(
        response,
        Response::Added(_)
            | Response::Edited(_)
            | Response::Removed { removed: true, .. }
            | Response::Reset { .. }
    )
}

/// Runs the console until `quit` or end of input.
///
/// Input problems are printed and the loop continues; store and I/O failures
/// end the loop with an error.
pub async fn run_console<R, W>(
    ledger: &LedgerService,
    settings: &Settings,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(output, "{HELP_TEXT}")?;

    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = match parse_line(&line?) {
            Ok(Input::Quit) => break,
            Ok(Input::Blank) => continue,
            Ok(Input::Command(command)) => command,
            Err(e) => {
                writeln!(output, "{e}")?;
                continue;
            }
        };

        if let Some(prompt) = command.confirmation_prompt() {
            if !confirm(&mut lines, &mut output, &prompt)? {
                writeln!(output, "Cancelled.")?;
                continue;
            }
        }

        let response = match dispatch(ledger, settings, command).await {
            Ok(Response::Duplicate(pending)) => {
                writeln!(output, "{}", render_response(&Response::Duplicate(pending.clone())))?;
                if confirm(&mut lines, &mut output, "Register anyway?")? {
                    Response::Added(ledger.confirm_duplicate(pending).await?)
                } else {
                    writeln!(output, "Not registered.")?;
                    continue;
                }
            }
            Ok(response) => response,
            Err(e @ (Error::Store(_) | Error::Io(_))) => {
                error!("Fatal error: {}", e);
                return Err(e);
            }
            Err(e) => {
                writeln!(output, "{e}")?;
                continue;
            }
        };

        writeln!(output, "{}", render_response(&response))?;
        if changes_ledger(&response) {
            let dashboard = ledger.dashboard().await?;
            writeln!(output, "{}", render_dashboard(&dashboard))?;
        }
    }

    Ok(())
}
