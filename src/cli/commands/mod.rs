//! CLI command implementations

pub mod completions;
pub mod config;
pub mod measure;
pub mod product;
pub mod proforma;

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

use crate::cli::helpers::is_interactive;
use crate::core::error::ClientError;
use crate::core::pagination::{render_window, PaginatedResponse};
use crate::core::query::QueryState;
use crate::services::ListSource;
use crate::view::list::ListView;
use crate::view::table::PageControls;

/// Refresh `view` and hand back the page it now shows
pub(crate) fn load_page<T: Clone, S: ListSource<T>>(
    view: &mut ListView<T>,
    source: &S,
) -> std::result::Result<Arc<PaginatedResponse<T>>, ClientError> {
    let state = view.refresh(source).clone();
    match state {
        QueryState::Ready(data) => Ok(data),
        QueryState::Failed(e) => Err(e),
        QueryState::Idle | QueryState::Loading => Err(ClientError::Decode {
            path: view
                .current_key()
                .map(|k| k.to_string())
                .unwrap_or_default(),
            message: "list request did not complete".to_string(),
        }),
    }
}

/// Ask before deleting; `--yes` skips the prompt
///
/// Without a terminal to ask on, deletion is refused rather than assumed.
pub(crate) fn confirm_delete(label: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !is_interactive() {
        return Err(miette::miette!(
            "refusing to delete {} without confirmation (pass --yes)",
            label
        ));
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Delete {}?", label))
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Summary line and page strip under a list
pub(crate) fn print_page_footer(controls: &PageControls) {
    println!();
    println!("{}", style(&controls.summary).dim());
    if controls.total_pages > 1 {
        println!(
            "{} {}   {}",
            style("Pages:").dim(),
            render_window(&controls.links),
            style("(--page N to jump)").dim()
        );
    }
}
