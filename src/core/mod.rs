//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod http;
pub mod pagination;
pub mod query;

pub use config::Config;
pub use entity::Entity;
pub use error::{ClientError, ErrorKind, ValidationErrors};
pub use gateway::{Accept, ApiRequest, ApiResponse, Gateway, GatewayExt, Method};
pub use http::HttpGateway;
pub use pagination::{PageMeta, PaginatedResponse, PaginationParams};
pub use query::{QueryClient, QueryKey, QueryState};
