//! Shared helper functions for CLI commands

use console::style;
use std::io::{self, BufRead, IsTerminal};

use crate::core::error::{ClientError, ErrorKind};

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Read entity IDs from stdin if it is piped
///
/// Enables pipelines like:
/// ```bash
/// ferre product list --search clavo -o id | ferre product delete -y
/// ```
///
/// IDs are read one per line; blank lines are ignored.
pub fn read_ids_from_stdin() -> Option<Vec<String>> {
    let stdin = io::stdin();

    if stdin.is_terminal() {
        return None;
    }

    let ids: Vec<String> = stdin
        .lock()
        .lines()
        .map_while(Result::ok)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// Interactive prompts need a terminal on both ends
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Print a client error to stderr the way its kind calls for
///
/// Validation errors are listed per field; everything else gets a single
/// line with a hint about what to try next.
pub fn print_error(err: &ClientError) {
    match err.kind() {
        ErrorKind::Validation => {
            eprintln!("{} Please fix the following:", style("✗").red());
            if let Some(errors) = err.validation_errors() {
                for e in errors.iter() {
                    eprintln!("   {}: {}", style(e.field).yellow(), e.message);
                }
            }
        }
        ErrorKind::Transport => {
            eprintln!("{} {}", style("✗").red(), err);
            eprintln!("   {}", style("Check your connection and try again.").dim());
        }
        ErrorKind::Server => {
            eprintln!("{} {}", style("✗").red(), err);
        }
        ErrorKind::Local => {
            eprintln!("{} {}", style("✗").red(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Centímetro cuadrado", 10), "Centíme...");
    }
}
