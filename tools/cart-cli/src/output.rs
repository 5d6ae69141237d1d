//! Output formatting for the CLI.

use console::style;
use turbo_cart::Item;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print the items of a cart.
    pub fn items(&self, title: &str, items: &[Item]) {
        if self.json {
            self.json(&items);
            return;
        }

        self.header(title);
        if items.is_empty() {
            println!("  {}", style("(empty)").dim());
            return;
        }
        for item in items {
            println!("  {} {} {}", style("•").dim(), item.id, format_details(item));
        }
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Render item details as `key=value` pairs.
pub fn format_details(item: &Item) -> String {
    item.details
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(s) => format!("{}={}", key, s),
            None => format!("{}={}", key, value),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
