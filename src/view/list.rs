//! Paginated list view model
//!
//! Owns the page/limit selection and the form flags for one list screen.
//! Data itself lives in the query cache; the view only remembers which key
//! it is showing and the state of the last read for that key.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::error::ClientError;
use crate::core::pagination::{PaginatedResponse, PaginationParams, TABLE_PAGE_SIZES};
use crate::core::query::{QueryKey, QueryState};
use crate::services::ListSource;

pub struct ListView<T> {
    page: u32,
    limit: u32,
    page_sizes: &'static [u32],
    editing: Option<T>,
    form_visible: bool,
    current_key: Option<QueryKey>,
    state: QueryState<PaginatedResponse<T>>,
}

impl<T: Clone> ListView<T> {
    /// A view on page 1 offering the table page sizes
    pub fn new(limit: u32) -> Self {
        Self::with_page_sizes(limit, TABLE_PAGE_SIZES)
    }

    /// A view offering a specific page-size set (e.g. the card grid sizes)
    ///
    /// A `limit` outside the set falls back to the first allowed size.
    pub fn with_page_sizes(limit: u32, page_sizes: &'static [u32]) -> Self {
        let limit = if page_sizes.contains(&limit) {
            limit
        } else {
            page_sizes.first().copied().unwrap_or(limit)
        };
        Self {
            page: 1,
            limit,
            page_sizes,
            editing: None,
            form_visible: false,
            current_key: None,
            state: QueryState::Idle,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn page_sizes(&self) -> &'static [u32] {
        self.page_sizes
    }

    pub fn params(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn set_page(&mut self, page: u32) -> Result<(), ClientError> {
        if page < 1 {
            return Err(ClientError::invalid("page", "Page must be at least 1"));
        }
        self.page = page;
        Ok(())
    }

    /// Advance one page; returns false when already on the last known page
    pub fn next_page(&mut self) -> bool {
        if self.data().is_some_and(|data| !data.has_next()) {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Change the page size and return to page 1
    pub fn set_limit(&mut self, limit: u32) -> Result<(), ClientError> {
        if !self.page_sizes.contains(&limit) {
            let allowed: Vec<String> = self.page_sizes.iter().map(|n| n.to_string()).collect();
            return Err(ClientError::invalid(
                "limit",
                format!("Page size must be one of {}", allowed.join(", ")),
            ));
        }
        self.limit = limit;
        self.page = 1;
        Ok(())
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Read the current page through `source`
    pub fn refresh<S: ListSource<T>>(&mut self, source: &S) -> &QueryState<PaginatedResponse<T>> {
        let params = self.params();
        let key = source.list_key(&params);
        self.current_key = Some(key.clone());
        self.state = QueryState::Loading;
        let result = source.list(&params);
        self.accept(&key, result);
        &self.state
    }

    /// Apply a resolved read; returns false if `key` is no longer current
    pub fn accept(
        &mut self,
        key: &QueryKey,
        result: Result<Arc<PaginatedResponse<T>>, ClientError>,
    ) -> bool {
        if self.current_key.as_ref() != Some(key) {
            debug!(%key, "ignoring response for superseded query");
            return false;
        }
        if let Err(ref e) = result {
            warn!(%key, error = %e, "failed to load list");
        }
        self.state = result.into();
        true
    }

    pub fn current_key(&self) -> Option<&QueryKey> {
        self.current_key.as_ref()
    }

    pub fn state(&self) -> &QueryState<PaginatedResponse<T>> {
        &self.state
    }

    pub fn data(&self) -> Option<&Arc<PaginatedResponse<T>>> {
        self.state.data()
    }

    // =========================================================================
    // Form
    // =========================================================================

    /// Show the form in create mode
    pub fn open_create(&mut self) {
        self.editing = None;
        self.form_visible = true;
    }

    /// Show the form seeded with `entity`
    pub fn open_edit(&mut self, entity: T) {
        self.editing = Some(entity);
        self.form_visible = true;
    }

    pub fn close_form(&mut self) {
        self.editing = None;
        self.form_visible = false;
    }

    pub fn editing(&self) -> Option<&T> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn form_visible(&self) -> bool {
        self.form_visible
    }

    /// Run a create or update
    ///
    /// `op` receives the entity being edited (`None` in create mode). On
    /// success the form closes; on failure it stays open and the error is
    /// returned unchanged.
    pub fn submit<R, F>(&mut self, op: F) -> Result<R, ClientError>
    where
        F: FnOnce(Option<&T>) -> Result<R, ClientError>,
    {
        match op(self.editing.as_ref()) {
            Ok(result) => {
                self.close_form();
                Ok(result)
            }
            Err(e) => {
                warn!(editing = self.editing.is_some(), error = %e, "form submission failed");
                Err(e)
            }
        }
    }
}
