//! Styled terminal output utilities.

use owo_colors::OwoColorize;
use pgmigrator_core::{Action, ActionKind, ActionOutcome};

/// Print a header/title
pub fn header(text: &str) {
    println!();
    println!("{}", text.bold().cyan());
    println!("{}", "─".repeat(text.chars().count()).dimmed());
    println!();
}

/// Print a section header
pub fn section(text: &str) {
    println!("{}", text.bold().white());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Print dimmed text
pub fn dim(text: &str) {
    println!("{}", text.dimmed());
}

/// `Add migration "users"`
pub fn action_line(action: &Action) -> String {
    format!("{} migration \"{}\"", capitalize(action.action.as_str()), action.name)
}

/// `Add migration "users":	done`
pub fn outcome_line(outcome: &ActionOutcome) -> String {
    format!(
        "{} migration \"{}\":\t{}",
        capitalize(outcome.action.as_str()),
        outcome.name,
        if outcome.success { "done" } else { "failed" }
    )
}

/// Print a planned action, colored by kind
pub fn action(action: &Action) {
    println!("{}", style_kind(action.action, &action_line(action)));
}

/// Print an action outcome
pub fn outcome(outcome: &ActionOutcome) {
    let line = outcome_line(outcome);
    if outcome.success {
        println!("{}", style_kind(outcome.action, &line));
    } else {
        println!("{}", line.red().bold());
    }
}

fn style_kind(kind: ActionKind, text: &str) -> String {
    match kind {
        ActionKind::Skip | ActionKind::Shrink => text.dimmed().to_string(),
        ActionKind::Remove => text.yellow().to_string(),
        ActionKind::Change => text.cyan().to_string(),
        ActionKind::Add => text.green().to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
