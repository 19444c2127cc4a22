//! Shared test helpers for integration tests
//!
//! Provides the `ferre` binary helper and an in-memory backend that speaks
//! the same REST dialect as the real server.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use ferre::core::error::ClientError;
use ferre::core::gateway::{ApiRequest, ApiResponse, Gateway, Method};

/// Helper to get a ferre command that never reads the user's config
pub fn ferre() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("ferre"));
    cmd.env("FERRE_CONFIG", "/nonexistent/ferre-test-config.yaml")
        .env_remove("FERRE_API_URL")
        .env_remove("FERRE_LOG");
    cmd
}

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% ferre test document\n%%EOF\n";

/// In-memory stand-in for the REST backend
pub struct FakeBackend {
    products: Mutex<Vec<Value>>,
    proformas: Mutex<Vec<Value>>,
    next_id: AtomicU64,
    requests: Mutex<Vec<ApiRequest>>,
    overrides: Mutex<HashMap<(Method, String), ApiResponse>>,
    offline: Mutex<bool>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            products: Mutex::new(Vec::new()),
            proformas: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            requests: Mutex::new(Vec::new()),
            overrides: Mutex::new(HashMap::new()),
            offline: Mutex::new(false),
        }
    }

    /// Backend pre-loaded with `n` products named `Producto 1..=n`
    pub fn with_products(n: usize) -> Self {
        let backend = Self::new();
        for i in 1..=n {
            backend.add_product(json!({
                "name": format!("Producto {}", i),
                "price": i as f64,
                "stock": i * 3,
                "unitMeasure": "PIEZA",
            }));
        }
        backend
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    /// Store a product as the server would; returns its id
    pub fn add_product(&self, mut body: Value) -> String {
        let id = self.next_id();
        body["productId"] = json!(id);
        if let Some(unit) = body.get("unitMeasure").cloned() {
            body["measure"] = unit;
        }
        self.products.lock().unwrap().push(body);
        id
    }

    pub fn product_count(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    /// Always answer `method path` with `response`
    pub fn respond(&self, method: Method, path: &str, response: ApiResponse) {
        self.overrides
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
    }

    /// Make every request fail as if the server were unreachable
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    /// Number of requests sent with `method` to exactly `path`
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn paginate(items: &[Value], request: &ApiRequest) -> ApiResponse {
        let page: u32 = request
            .query_param("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);
        let limit: u32 = request
            .query_param("limit")
            .and_then(|p| p.parse().ok())
            .unwrap_or(10);
        let total = items.len() as u64;
        let total_pages = total.div_ceil(limit as u64) as u32;
        let start = ((page.saturating_sub(1)) * limit) as usize;
        let slice: Vec<Value> = items.iter().skip(start).take(limit as usize).cloned().collect();

        ApiResponse::json(
            200,
            &json!({
                "items": slice,
                "meta": {
                    "currentPage": page,
                    "itemsPerPage": limit,
                    "totalItems": total,
                    "totalPages": total_pages,
                }
            }),
        )
    }

    fn not_found(what: &str, id: &str) -> ApiResponse {
        ApiResponse::json(
            404,
            &json!({"statusCode": 404, "message": format!("{} {} not found", what, id)}),
        )
    }

    fn route_products(&self, request: &ApiRequest, id: Option<&str>) -> ApiResponse {
        let mut products = self.products.lock().unwrap();
        let position = id.and_then(|id| {
            products
                .iter()
                .position(|p| p["productId"].as_str() == Some(id))
        });

        match (request.method, id) {
            (Method::Get, None) => Self::paginate(&products, request),
            (Method::Post, None) => {
                drop(products);
                let body = request.body.clone().unwrap_or(Value::Null);
                let id = self.add_product(body);
                let products = self.products.lock().unwrap();
                let created = products
                    .iter()
                    .find(|p| p["productId"].as_str() == Some(id.as_str()))
                    .cloned()
                    .unwrap_or(Value::Null);
                ApiResponse::json(201, &created)
            }
            (Method::Get, Some(id)) => match position {
                Some(i) => ApiResponse::json(200, &products[i]),
                None => Self::not_found("Product", id),
            },
            (Method::Put, Some(id)) => match position {
                Some(i) => {
                    if let Some(Value::Object(changes)) = &request.body {
                        for (k, v) in changes {
                            products[i][k] = v.clone();
                            if k == "unitMeasure" {
                                products[i]["measure"] = v.clone();
                            }
                        }
                    }
                    ApiResponse::json(200, &products[i])
                }
                None => Self::not_found("Product", id),
            },
            (Method::Delete, Some(id)) => match position {
                Some(i) => {
                    products.remove(i);
                    ApiResponse::new(200, "")
                }
                None => Self::not_found("Product", id),
            },
            _ => ApiResponse::new(405, "method not allowed"),
        }
    }

    fn route_proformas(&self, request: &ApiRequest, id: Option<&str>) -> ApiResponse {
        match (request.method, id) {
            (Method::Get, None) => Self::paginate(&self.proformas.lock().unwrap(), request),
            (Method::Get, Some(id)) => {
                let proformas = self.proformas.lock().unwrap();
                match proformas.iter().find(|p| p["id"].as_str() == Some(id)) {
                    Some(p) => ApiResponse::json(200, p),
                    None => Self::not_found("Proforma", id),
                }
            }
            (Method::Post, None) => self.create_proforma(request),
            _ => ApiResponse::new(405, "method not allowed"),
        }
    }

    fn create_proforma(&self, request: &ApiRequest) -> ApiResponse {
        let body = request.body.clone().unwrap_or(Value::Null);
        let products = self.products.lock().unwrap();

        let mut created_items = Vec::new();
        let mut listed_items = Vec::new();
        let mut total = 0.0;
        for item in body["items"].as_array().cloned().unwrap_or_default() {
            let product_id = item["productId"].as_str().unwrap_or_default();
            let Some(product) = products
                .iter()
                .find(|p| p["productId"].as_str() == Some(product_id))
            else {
                return Self::not_found("Product", product_id);
            };
            let quantity = item["quantity"].as_u64().unwrap_or(1);
            let price = product["price"].as_f64().unwrap_or(0.0);
            let subtotal = price * quantity as f64;
            total += subtotal;
            created_items.push(json!({
                "product": product["name"],
                "quantity": quantity,
                "unitAmount": price,
                "subtotal": subtotal,
            }));
            listed_items.push(json!({
                "product": product["name"],
                "quantity": quantity,
                "unitPrice": price,
            }));
        }
        drop(products);

        let id = self.next_id();
        let mut proformas = self.proformas.lock().unwrap();
        let number = proformas.len() + 1;
        let base = json!({
            "id": id,
            "numberProforma": format!("{:04}", number),
            "dateProforma": "2026-10-18",
            "client": body["client"],
            "address": body["address"],
            "total": total,
        });

        let mut listed = base.clone();
        listed["items"] = json!(listed_items);
        proformas.push(listed);

        let mut created = base;
        created["items"] = json!(created_items);
        ApiResponse::json(201, &created)
    }

    fn route_report(&self, id: &str, kind: &str) -> ApiResponse {
        let exists = self
            .proformas
            .lock()
            .unwrap()
            .iter()
            .any(|p| p["id"].as_str() == Some(id));
        if !exists {
            return Self::not_found("Proforma", id);
        }
        match kind {
            "pdf" => ApiResponse::new(200, PDF_BYTES).with_content_type("application/pdf"),
            "preview" => ApiResponse::new(
                200,
                format!("<html><body><h1>Proforma {}</h1></body></html>", id),
            )
            .with_content_type("text/html"),
            _ => ApiResponse::new(404, ""),
        }
    }
}

impl Gateway for FakeBackend {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());

        if *self.offline.lock().unwrap() {
            return Err(ClientError::Transport {
                url: format!("http://fake{}", request.path),
                message: "connection refused".to_string(),
            });
        }
        if let Some(response) = self
            .overrides
            .lock()
            .unwrap()
            .get(&(request.method, request.path.clone()))
        {
            return Ok(response.clone());
        }

        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        let response = match segments.as_slice() {
            ["products"] => self.route_products(request, None),
            ["products", id] => self.route_products(request, Some(*id)),
            ["proforma"] => self.route_proformas(request, None),
            ["proforma", id] => self.route_proformas(request, Some(*id)),
            ["reports", "proforma", id, kind] => self.route_report(id, kind),
            _ => ApiResponse::new(404, "no such route"),
        };
        Ok(response)
    }
}
