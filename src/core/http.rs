//! HTTP gateway backed by `reqwest`'s blocking client

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, error};

use crate::core::config::ApiConfig;
use crate::core::error::ClientError;
use crate::core::gateway::{ApiRequest, ApiResponse, Gateway, Method};

/// Gateway that talks to the real backend
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Build a gateway for the configured base URL
    ///
    /// No connection is opened here; the first request does that.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(concat!("ferre/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| ClientError::Transport {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a request path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Gateway for HttpGateway {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        builder = builder.header(ACCEPT, request.accept.mime());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| {
            error!(method = %request.method, %url, error = %e, "transport failure");
            ClientError::Transport {
                url: url.clone(),
                message: e.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().map_err(|e| ClientError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        debug!(%url, status, bytes = body.len(), "response received");

        Ok(ApiResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
