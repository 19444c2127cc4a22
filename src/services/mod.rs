//! Entity services - typed CRUD over the gateway, cached by the query layer

pub mod products;
pub mod proformas;

pub use products::ProductService;
pub use proformas::ProformaService;

use std::sync::Arc;

use crate::core::error::ClientError;
use crate::core::pagination::{PaginatedResponse, PaginationParams};
use crate::core::query::QueryKey;

/// Anything a paginated view can pull pages from
pub trait ListSource<T> {
    /// Cache key the page for `params` is stored under
    fn list_key(&self, params: &PaginationParams) -> QueryKey;

    fn list(&self, params: &PaginationParams) -> Result<Arc<PaginatedResponse<T>>, ClientError>;
}

/// Reject envelopes that break the pagination invariants
pub(crate) fn checked<T>(
    path: &str,
    page: PaginatedResponse<T>,
) -> Result<PaginatedResponse<T>, ClientError> {
    page.check().map_err(|message| {
        tracing::warn!(%path, %message, "rejecting paginated response");
        ClientError::Decode {
            path: path.to_string(),
            message,
        }
    })?;
    Ok(page)
}
