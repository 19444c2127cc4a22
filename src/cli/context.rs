//! Per-invocation wiring: configuration, gateway, query cache and services

use std::sync::Arc;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::core::error::ClientError;
use crate::core::gateway::Gateway;
use crate::core::http::HttpGateway;
use crate::core::query::QueryClient;
use crate::core::Config;
use crate::services::{ProductService, ProformaService};

/// Everything a command needs to talk to the backend
pub struct AppContext {
    pub config: Config,
    pub queries: Arc<QueryClient>,
    pub products: ProductService,
    pub proformas: ProformaService,
}

impl AppContext {
    /// Build from the loaded config, `--api-url` taking precedence
    pub fn new(global: &GlobalOpts) -> Result<Self, ClientError> {
        let config = Config::load().with_api_url(global.api_url.as_deref());
        let gateway = HttpGateway::new(&config.api)?;
        debug!(base_url = %gateway.base_url(), "using API");
        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    /// Build around any gateway (used by tests with an in-memory backend)
    pub fn with_gateway(config: Config, gateway: Arc<dyn Gateway>) -> Self {
        let queries = Arc::new(QueryClient::new());
        Self {
            products: ProductService::new(gateway.clone(), queries.clone()),
            proformas: ProformaService::new(gateway, queries.clone()),
            queries,
            config,
        }
    }

    pub fn currency(&self) -> &str {
        &self.config.display.currency
    }
}
