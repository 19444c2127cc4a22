//! View models - rendering-agnostic state behind every list and form
//!
//! The terminal commands drive these, but nothing here prints or prompts.

pub mod columns;
pub mod list;
pub mod product_form;
pub mod proforma_form;
pub mod table;

pub use list::ListView;
pub use product_form::ProductForm;
pub use proforma_form::{ProductPicker, ProformaForm, ProformaLine};
pub use table::{Column, DeleteOutcome, DeleteTracker, PageControls, SortDirection, TableView};
