use colored::Colorize;
use modelkit::{Diagnostic, Diagnostics, Document, Severity};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Print one diagnostic
pub fn diagnostic(d: &Diagnostic) {
    let line = format!("{}: {}", d.kind.label(), d.summary);
    match d.severity {
        Severity::Error => error(&line),
        Severity::Warning => warn(&line),
        Severity::Info => info(&line),
    }
    if !d.detail.is_empty() {
        dim(&d.detail);
    }
}

/// Print every diagnostic, errors first; info notes only when verbose
pub fn diagnostics(diags: &Diagnostics, verbose: bool) {
    let mut sorted: Vec<&Diagnostic> = diags
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info)
        .collect();
    sorted.sort_by_key(|d| severity_rank(d.severity));
    for d in sorted {
        diagnostic(d);
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    }
}

// ============================================================================
// Documents
// ============================================================================

const REDACTED: &str = "(sensitive)";

/// Copy of a document with write-only values masked, for display
pub fn redact(document: &Document, secret_keys: &[&str]) -> Document {
    let mut value = Value::Object(document.clone());
    redact_value(&mut value, secret_keys);
    match value {
        Value::Object(redacted) => redacted,
        _ => Document::new(),
    }
}

fn redact_value(value: &mut Value, secret_keys: &[&str]) {
    match value {
        Value::Object(object) => {
            for (key, child) in object.iter_mut() {
                if secret_keys.contains(&key.as_str()) && !child.is_null() {
                    *child = Value::String(REDACTED.to_string());
                } else {
                    redact_value(child, secret_keys);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                redact_value(item, secret_keys);
            }
        }
        _ => {}
    }
}

/// Pretty JSON rendering used for display and diffs
pub fn pretty(document: &Document) -> String {
    serde_json::to_string_pretty(document).unwrap_or_default()
}

/// Changed lines between two renderings
pub fn changed_lines(old: &str, new: &str) -> Vec<(ChangeTag, String)> {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .map(|change| (change.tag(), change.to_string_lossy().into_owned()))
        .collect()
}

/// Print a line diff; returns whether anything changed
pub fn print_diff(old: &str, new: &str) -> bool {
    let changes = changed_lines(old, new);
    for (tag, line) in &changes {
        match tag {
            ChangeTag::Delete => print!("    {}", format!("- {line}").red()),
            ChangeTag::Insert => print!("    {}", format!("+ {line}").green()),
            ChangeTag::Equal => {}
        }
    }
    !changes.is_empty()
}
