//! Product entity type - catalog items sold by the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{opt_string_or_number, Entity};
use crate::core::error::ValidationErrors;
use crate::entities::measure::{MeasureRef, UnitMeasure};

/// Stock above this count is considered healthy
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A product as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend-assigned identifier (absent before creation)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_string_or_number"
    )]
    pub product_id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit price
    pub price: f64,

    /// Units on hand; `None` means stock is not tracked
    #[serde(default)]
    pub stock: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<MeasureRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Stock badge shown next to a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    Untracked,
    Out,
    Low,
    Healthy,
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockLevel::Untracked => write!(f, "untracked"),
            StockLevel::Out => write!(f, "out"),
            StockLevel::Low => write!(f, "low"),
            StockLevel::Healthy => write!(f, "ok"),
        }
    }
}

impl Product {
    pub fn stock_level(&self) -> StockLevel {
        match self.stock {
            None => StockLevel::Untracked,
            Some(0) => StockLevel::Out,
            Some(n) if n > LOW_STOCK_THRESHOLD => StockLevel::Healthy,
            Some(_) => StockLevel::Low,
        }
    }

    /// Unit of measure, when the product carries a known one
    pub fn unit(&self) -> Option<UnitMeasure> {
        self.measure.as_ref().and_then(|m| m.unit())
    }

    pub fn measure_label(&self) -> String {
        self.measure
            .as_ref()
            .map(|m| m.label())
            .unwrap_or_else(|| "No unit".to_string())
    }

    /// Value of the stock on hand (zero when untracked)
    pub fn inventory_value(&self) -> f64 {
        self.price * self.stock.unwrap_or(0) as f64
    }

    /// Case-insensitive match on name or brand
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self
                .brand
                .as_deref()
                .is_some_and(|b| b.to_lowercase().contains(&term))
    }
}

impl Entity for Product {
    const CACHE_KEY: &'static str = "products";
    const NAME: &'static str = "product";

    fn id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    fn title(&self) -> &str {
        &self.name
    }
}

/// Payload for `POST /products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductDto {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub price: f64,

    /// `None` leaves the stock untracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    pub unit_measure: UnitMeasure,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl CreateProductDto {
    pub fn new(name: impl Into<String>, price: f64, stock: u32, unit_measure: UnitMeasure) -> Self {
        Self {
            name: name.into(),
            brand: None,
            model: None,
            description: None,
            price,
            stock: Some(stock),
            sku: None,
            unit_measure,
            category_id: None,
        }
    }

    /// Check the invariants the backend relies on
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            errors.add("price", "Price must be positive");
        }
        errors.into_result()
    }
}

/// Payload for `PUT /products/:id`; only the fields present are changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_measure: Option<UnitMeasure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl UpdateProductDto {
    pub fn is_empty(&self) -> bool {
        *self == UpdateProductDto::default()
    }

    /// Only the fields of `dto` that differ from `product`
    pub fn changes(product: &Product, dto: &CreateProductDto) -> Self {
        fn changed(old: &Option<String>, new: &Option<String>) -> Option<String> {
            if old.as_deref().unwrap_or("") != new.as_deref().unwrap_or("") {
                Some(new.clone().unwrap_or_default())
            } else {
                None
            }
        }

        Self {
            name: (product.name != dto.name).then(|| dto.name.clone()),
            brand: changed(&product.brand, &dto.brand),
            model: changed(&product.model, &dto.model),
            description: changed(&product.description, &dto.description),
            price: (product.price != dto.price).then_some(dto.price),
            stock: dto.stock.filter(|s| product.stock != Some(*s)),
            sku: changed(&product.sku, &dto.sku),
            unit_measure: (product.unit() != Some(dto.unit_measure)).then_some(dto.unit_measure),
            category_id: dto.category_id.clone(),
        }
    }

    /// Check the fields that are present
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                errors.add("name", "Name is required");
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price <= 0.0 {
                errors.add("price", "Price must be positive");
            }
        }
        errors.into_result()
    }
}

impl From<CreateProductDto> for UpdateProductDto {
    fn from(dto: CreateProductDto) -> Self {
        Self {
            name: Some(dto.name),
            brand: dto.brand,
            model: dto.model,
            description: dto.description,
            price: Some(dto.price),
            stock: dto.stock,
            sku: dto.sku,
            unit_measure: Some(dto.unit_measure),
            category_id: dto.category_id,
        }
    }
}
