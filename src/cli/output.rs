//! Output formatting utilities

use std::io::IsTerminal;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
///
/// `Auto` lists render as a table on a terminal and as TSV when piped.
/// `Auto` is kept for single entities and means the pretty detail view.
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto if is_list => {
            if std::io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Tsv
            }
        }
        other => other,
    }
}

/// Whether footers and hints should be printed along with the rows
pub fn is_decorated(format: OutputFormat) -> bool {
    matches!(format, OutputFormat::Table | OutputFormat::Auto)
}
