//! Output formatter for human-readable and JSON output
//!
//! Ensures consistent output formatting across all commands. In JSON mode an
//! operation prints exactly one result object on stdout.

use console::style;
use serde::Serialize;
use ydg_core::OperationResult;

use super::OutputConfig;

/// Formatter for CLI output
///
/// Handles both human-readable and JSON output formats based on configuration.
/// When JSON mode is enabled, all output is strict JSON without colors or progress.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Check if JSON output mode is enabled
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            println!("{} {message}", style("✓").green());
        } else {
            println!("✓ {message}");
        }
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else if self.colors_enabled() {
            eprintln!("{} {message}", style("✗").red());
        } else {
            eprintln!("✗ {message}");
        }
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            eprintln!("{} {message}", style("⚠").yellow());
        } else {
            eprintln!("⚠ {message}");
        }
    }

    /// Output JSON directly
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Print the parts of a result every command shares
    ///
    /// Returns true when the caller should still render the payload, i.e. in
    /// human mode for a successful operation.
    pub fn result(&self, result: &OperationResult) -> bool {
        if self.config.json {
            self.json(result);
            return false;
        }

        for warning in &result.warnings {
            self.warning(warning);
        }

        match &result.error {
            Some(error) => {
                match error.bytes_transferred {
                    Some(bytes) if bytes > 0 => self.error(&format!(
                        "{} ({} transferred before the failure)",
                        error.message,
                        humansize::format_size(bytes, humansize::BINARY)
                    )),
                    _ => self.error(&error.message),
                }
                false
            }
            None => true,
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ydg_core::{Action, Error, ListPage, ResultData};

    #[test]
    fn test_formatter_default() {
        let formatter = Formatter::default();
        assert!(!formatter.is_json());
        assert!(!formatter.is_quiet());
        assert!(formatter.colors_enabled());
    }

    #[test]
    fn test_formatter_json_mode() {
        let config = OutputConfig {
            json: true,
            ..Default::default()
        };
        let formatter = Formatter::new(config);
        assert!(formatter.is_json());
        assert!(!formatter.colors_enabled()); // Colors disabled in JSON mode
    }

    #[test]
    fn test_formatter_no_color() {
        let config = OutputConfig {
            no_color: true,
            ..Default::default()
        };
        let formatter = Formatter::new(config);
        assert!(!formatter.colors_enabled());
    }

    #[test]
    fn test_result_payload_rendered_only_in_human_success() {
        let page = ListPage {
            path: "disk:/".into(),
            items: vec![],
            limit: 100,
            offset: 0,
            total: Some(0),
        };
        let ok = OperationResult::success(Action::List, ResultData::Listing(page), vec![]);
        let failed = OperationResult::failure(Action::List, &Error::auth("bad token"), vec![]);

        let human = Formatter::default();
        assert!(human.result(&ok));
        assert!(!human.result(&failed));

        let json = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(!json.result(&ok));
    }
}
