//! Remote data gateway - the seam between the client and the REST backend
//!
//! [`Gateway`] performs one HTTP exchange and nothing else. Status handling
//! and JSON decoding live in [`GatewayExt`], so every implementation (the
//! real [`HttpGateway`](crate::core::http::HttpGateway) or an in-memory
//! backend in tests) gets identical error semantics.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::core::error::{ClientError, ValidationErrors};

/// HTTP verbs used by the backend API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Content type requested through the `Accept` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accept {
    #[default]
    Json,
    Pdf,
    Html,
}

impl Accept {
    pub fn mime(&self) -> &'static str {
        match self {
            Accept::Json => "application/json",
            Accept::Pdf => "application/pdf",
            Accept::Html => "text/html",
        }
    }
}

/// `base/id` with `id` percent-encoded as a single path segment
///
/// `.` and `..` are refused since URL parsing would resolve them against
/// `base`.
pub fn resource_path(base: &str, id: &str) -> Result<String, ClientError> {
    if matches!(id.trim(), "" | "." | "..") {
        let mut errors = ValidationErrors::new();
        errors.add("id", format!("Invalid id '{}'", id));
        return Err(errors.into());
    }
    Ok(format!("{}/{}", base, urlencoding::encode(id)))
}

/// A request against the backend, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub accept: Accept,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            accept: Accept::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_queries(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn accept(mut self, accept: Accept) -> Self {
        self.accept = accept;
        self
    }

    /// Value of a query parameter, if set
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response from the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// JSON response with the given status
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: value.to_string().into_bytes(),
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Extract the most useful error message from an error body
    ///
    /// NestJS-style bodies carry `message` as a string or an array of
    /// strings; anything else falls back to the raw body text.
    pub fn error_message(&self) -> String {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&self.body) {
            match value.get("message") {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(serde_json::Value::Array(items)) => {
                    let parts: Vec<String> = items
                        .iter()
                        .map(|v| match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect();
                    return parts.join(", ");
                }
                _ => {}
            }
        }

        let text = self.text();
        if text.trim().is_empty() {
            format!("HTTP {}", self.status)
        } else {
            text
        }
    }
}

/// One HTTP exchange with the backend
///
/// Implementations report transport failures as
/// [`ClientError::Transport`] and return every HTTP response, whatever its
/// status, as `Ok`.
pub trait Gateway: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// Typed helpers shared by every gateway
pub trait GatewayExt: Gateway {
    /// Send a request and turn non-2xx responses into [`ClientError::Server`]
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.send(request)?;
        if response.is_success() {
            Ok(response)
        } else {
            let message = response.error_message();
            warn!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                %message,
                "request failed"
            );
            Err(ClientError::Server {
                status: response.status,
                message,
            })
        }
    }

    fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.execute(&request)?;
        decode(&request.path, &response)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = ApiRequest::post(path).with_body(encode(path, body)?);
        let response = self.execute(&request)?;
        decode(path, &response)
    }

    fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = ApiRequest::put(path).with_body(encode(path, body)?);
        let response = self.execute(&request)?;
        decode(path, &response)
    }

    fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(&ApiRequest::delete(path))?;
        Ok(())
    }

    fn get_bytes(&self, path: &str, accept: Accept) -> Result<Vec<u8>, ClientError> {
        let response = self.execute(&ApiRequest::get(path).accept(accept))?;
        Ok(response.body)
    }

    fn get_text(&self, path: &str, accept: Accept) -> Result<String, ClientError> {
        let response = self.execute(&ApiRequest::get(path).accept(accept))?;
        Ok(response.text())
    }
}

impl<G: Gateway + ?Sized> GatewayExt for G {}

fn encode<B: Serialize>(path: &str, body: &B) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode {
        path: path.to_string(),
        message: format!("could not encode request body: {}", e),
    })
}

fn decode<T: DeserializeOwned>(path: &str, response: &ApiResponse) -> Result<T, ClientError> {
    serde_json::from_slice(&response.body).map_err(|e| {
        warn!(%path, error = %e, "could not decode response body");
        ClientError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        }
    })
}
