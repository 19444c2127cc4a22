//! Table/grid view model
//!
//! A projection of one page of entities through column descriptors, with
//! local sort and filter state and per-row delete tracking. Page numbers
//! are never owned here; [`PageControls`] only reflects the page metadata.

use dashmap::DashSet;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::entity::Entity;
use crate::core::error::ClientError;
use crate::core::pagination::{page_window, PageLink, PaginatedResponse, PAGE_WINDOW};

type CellFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type SortFn<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;

/// How one field of an entity is shown
pub struct Column<T> {
    pub key: &'static str,
    pub header: &'static str,
    cell: CellFn<T>,
    numeric: Option<SortFn<T>>,
}

impl<T> Column<T> {
    pub fn new(
        key: &'static str,
        header: &'static str,
        cell: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            key,
            header,
            cell: Box::new(cell),
            numeric: None,
        }
    }

    /// Sort this column by a numeric value instead of its text
    pub fn numeric(mut self, value: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        self.numeric = Some(Box::new(value));
        self
    }

    pub fn cell(&self, row: &T) -> String {
        (self.cell)(row)
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        match self.numeric {
            Some(ref value) => value(a).partial_cmp(&value(b)).unwrap_or(Ordering::Equal),
            None => self
                .cell(a)
                .to_lowercase()
                .cmp(&self.cell(b).to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Pagination strip state derived from page metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    /// "Showing 11 - 20 of 42 products"
    pub summary: String,
    pub links: Vec<PageLink>,
    pub has_previous: bool,
    pub has_next: bool,
    pub current_page: u32,
    pub total_pages: u32,
    pub limit: u32,
    pub page_sizes: &'static [u32],
}

/// Result of a delete request on one row
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    /// The user declined the confirmation
    Cancelled,
    /// A delete of this row is still running
    AlreadyInFlight,
    Deleted,
    Failed(ClientError),
}

/// Ids of rows whose delete is in flight
#[derive(Debug, Clone, Default)]
pub struct DeleteTracker {
    in_flight: Arc<DashSet<String>>,
}

impl DeleteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as deleting; `None` if it already is
    pub fn begin(&self, id: &str) -> Option<DeleteGuard> {
        if self.in_flight.insert(id.to_string()) {
            Some(DeleteGuard {
                in_flight: self.in_flight.clone(),
                id: id.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Clears the deleting marker when dropped
pub struct DeleteGuard {
    in_flight: Arc<DashSet<String>>,
    id: String,
}

impl Drop for DeleteGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.id);
    }
}

pub struct TableView<T> {
    columns: Vec<Column<T>>,
    data: Option<Arc<PaginatedResponse<T>>>,
    sort: Option<(usize, SortDirection)>,
    filter: String,
    preserve_local_state: bool,
    page_sizes: &'static [u32],
    deletes: DeleteTracker,
}

impl<T: Entity> TableView<T> {
    pub fn new(columns: Vec<Column<T>>, page_sizes: &'static [u32]) -> Self {
        Self {
            columns,
            data: None,
            sort: None,
            filter: String::new(),
            preserve_local_state: false,
            page_sizes,
            deletes: DeleteTracker::new(),
        }
    }

    /// Keep sort and filter when a new data set arrives
    pub fn preserve_local_state(mut self, preserve: bool) -> Self {
        self.preserve_local_state = preserve;
        self
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Show a new page of data
    ///
    /// Sort and filter go back to inert unless preservation is enabled. The
    /// same data set handed in again is not treated as new.
    pub fn set_data(&mut self, data: Arc<PaginatedResponse<T>>) {
        let is_new = self
            .data
            .as_ref()
            .map_or(true, |current| !Arc::ptr_eq(current, &data));
        if is_new && !self.preserve_local_state {
            self.sort = None;
            self.filter.clear();
        }
        self.data = Some(data);
    }

    pub fn data(&self) -> Option<&Arc<PaginatedResponse<T>>> {
        self.data.as_ref()
    }

    // =========================================================================
    // Sort & filter
    // =========================================================================

    /// Cycle a column through ascending, descending and unsorted
    ///
    /// Returns false if no column has that key.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        let Some(index) = self.columns.iter().position(|c| c.key == key) else {
            return false;
        };
        self.sort = match self.sort {
            Some((i, SortDirection::Ascending)) if i == index => {
                Some((index, SortDirection::Descending))
            }
            Some((i, SortDirection::Descending)) if i == index => None,
            _ => Some((index, SortDirection::Ascending)),
        };
        true
    }

    pub fn sort_state(&self) -> Option<(&'static str, SortDirection)> {
        self.sort.map(|(i, dir)| (self.columns[i].key, dir))
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.trim().to_string();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Visible rows after filtering and sorting
    pub fn rows(&self) -> Vec<&T> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let needle = self.filter.to_lowercase();
        let mut rows: Vec<&T> = data
            .items
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || self
                        .columns
                        .iter()
                        .any(|c| c.cell(row).to_lowercase().contains(&needle))
            })
            .collect();

        if let Some((index, dir)) = self.sort {
            let column = &self.columns[index];
            rows.sort_by(|a, b| {
                let ord = column.compare(a, b);
                match dir {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        rows
    }

    /// Column headers with the sort indicator on the sorted column
    pub fn headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| match self.sort {
                Some((s, SortDirection::Ascending)) if s == i => format!("{} ▲", c.header),
                Some((s, SortDirection::Descending)) if s == i => format!("{} ▼", c.header),
                _ => c.header.to_string(),
            })
            .collect()
    }

    pub fn cells(&self, row: &T) -> Vec<String> {
        self.columns.iter().map(|c| c.cell(row)).collect()
    }

    // =========================================================================
    // Pagination controls
    // =========================================================================

    pub fn controls(&self, noun_plural: &str) -> Option<PageControls> {
        let data = self.data.as_ref()?;
        let meta = data.meta;
        Some(PageControls {
            summary: data.summary(noun_plural),
            links: page_window(meta.current_page, meta.total_pages, PAGE_WINDOW),
            has_previous: data.has_previous(),
            has_next: data.has_next(),
            current_page: meta.current_page,
            total_pages: meta.total_pages,
            limit: meta.items_per_page,
            page_sizes: self.page_sizes,
        })
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete one row after confirmation
    ///
    /// A row whose delete is still running refuses a second request without
    /// asking. The row is marked deleting for as long as `on_delete` runs,
    /// whether it succeeds or fails.
    pub fn request_delete<C, D>(&self, id: &str, confirm: C, on_delete: D) -> DeleteOutcome
    where
        C: FnOnce() -> bool,
        D: FnOnce(&str) -> Result<(), ClientError>,
    {
        if self.deletes.is_deleting(id) {
            debug!(%id, "delete already in flight");
            return DeleteOutcome::AlreadyInFlight;
        }
        if !confirm() {
            return DeleteOutcome::Cancelled;
        }
        let Some(_guard) = self.deletes.begin(id) else {
            return DeleteOutcome::AlreadyInFlight;
        };

        match on_delete(id) {
            Ok(()) => {
                info!(entity = T::NAME, %id, "deleted");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(entity = T::NAME, %id, error = %e, "delete failed");
                DeleteOutcome::Failed(e)
            }
        }
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deletes.is_deleting(id)
    }

    pub fn delete_tracker(&self) -> &DeleteTracker {
        &self.deletes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pagination::{PageMeta, TABLE_PAGE_SIZES};
    use crate::entities::product::Product;

    fn product(id: &str, name: &str, price: f64) -> Product {
        serde_json::from_value(serde_json::json!({
            "productId": id,
            "name": name,
            "price": price,
            "stock": 5
        }))
        .unwrap()
    }

    fn page(items: Vec<Product>, current: u32, total_items: u64) -> Arc<PaginatedResponse<Product>> {
        let total_pages = total_items.div_ceil(10) as u32;
        Arc::new(PaginatedResponse {
            items,
            meta: PageMeta {
                current_page: current,
                items_per_page: 10,
                total_items,
                total_pages,
            },
        })
    }

    fn table() -> TableView<Product> {
        let columns = vec![
            Column::new("name", "Name", |p: &Product| p.name.clone()),
            Column::new("price", "Price", |p: &Product| format!("{:.2}", p.price))
                .numeric(|p: &Product| p.price),
        ];
        let mut table = TableView::new(columns, TABLE_PAGE_SIZES);
        table.set_data(page(
            vec![
                product("1", "Martillo", 25.5),
                product("2", "alicate", 100.0),
                product("3", "Clavos", 3.0),
            ],
            1,
            3,
        ));
        table
    }

    fn names(table: &TableView<Product>) -> Vec<String> {
        table.rows().iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_sort_cycles() {
        let mut table = table();
        assert!(table.toggle_sort("name"));
        assert_eq!(names(&table), ["alicate", "Clavos", "Martillo"]);
        assert_eq!(table.headers()[0], "Name ▲");

        table.toggle_sort("name");
        assert_eq!(names(&table), ["Martillo", "Clavos", "alicate"]);

        table.toggle_sort("name");
        assert_eq!(table.sort_state(), None);
        assert_eq!(names(&table), ["Martillo", "alicate", "Clavos"]);

        assert!(!table.toggle_sort("missing"));
    }

    #[test]
    fn test_numeric_sort() {
        let mut table = table();
        table.toggle_sort("price");
        assert_eq!(names(&table), ["Clavos", "Martillo", "alicate"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut table = table();
        table.set_filter("MART");
        assert_eq!(names(&table), ["Martillo"]);
    }

    #[test]
    fn test_new_data_resets_local_state() {
        let mut table = table();
        table.toggle_sort("name");
        table.set_filter("a");

        table.set_data(page(vec![product("4", "Taladro", 250.0)], 1, 1));
        assert_eq!(table.sort_state(), None);
        assert_eq!(table.filter(), "");
    }

    #[test]
    fn test_same_data_keeps_local_state() {
        let mut table = table();
        table.toggle_sort("name");
        let data = table.data().cloned().unwrap();
        table.set_data(data);
        assert!(table.sort_state().is_some());
    }

    #[test]
    fn test_preserved_local_state() {
        let mut table = table().preserve_local_state(true);
        table.set_filter("clav");
        table.set_data(page(vec![product("3", "Clavos", 3.0)], 1, 1));
        assert_eq!(table.filter(), "clav");
    }

    #[test]
    fn test_controls_reflect_meta() {
        let mut table = table();
        table.set_data(page(
            (11..=20).map(|i| product(&i.to_string(), "X", 1.0)).collect(),
            2,
            42,
        ));
        let controls = table.controls("products").unwrap();
        assert_eq!(controls.summary, "Showing 11 - 20 of 42 products");
        assert!(controls.has_previous);
        assert!(controls.has_next);
        assert_eq!(controls.total_pages, 5);
        assert_eq!(controls.page_sizes, TABLE_PAGE_SIZES);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let table = table();
        let mut called = false;
        let outcome = table.request_delete("1", || false, |_| {
            called = true;
            Ok(())
        });
        assert!(matches!(outcome, DeleteOutcome::Cancelled));
        assert!(!called);
    }

    #[test]
    fn test_row_is_disabled_while_deleting() {
        let table = table();
        let outcome = table.request_delete("1", || true, |id| {
            assert!(table.is_deleting(id));

            // Same row refused, other rows independent
            let again = table.request_delete("1", || true, |_| Ok(()));
            assert!(matches!(again, DeleteOutcome::AlreadyInFlight));
            let other = table.request_delete("2", || true, |_| Ok(()));
            assert!(matches!(other, DeleteOutcome::Deleted));
            Ok(())
        });

        assert!(matches!(outcome, DeleteOutcome::Deleted));
        assert!(!table.is_deleting("1"));
        assert_eq!(table.delete_tracker().in_flight(), 0);
    }

    #[test]
    fn test_failed_delete_clears_marker() {
        let table = table();
        let outcome = table.request_delete("1", || true, |_| {
            Err(ClientError::Server {
                status: 409,
                message: "Product is referenced by a proforma".into(),
            })
        });
        assert!(matches!(outcome, DeleteOutcome::Failed(ClientError::Server { status: 409, .. })));
        assert!(!table.is_deleting("1"));
    }
}
