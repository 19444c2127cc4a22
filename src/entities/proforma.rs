//! Proforma entity type - pre-sale quotations for store customers

use serde::{Deserialize, Serialize};

use crate::core::entity::{opt_string_or_number, string_or_number, Entity};
use crate::core::error::ValidationErrors;
use crate::entities::measure::MeasureRef;

/// A proforma as listed by `GET /proforma`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Human-readable sequence number
    #[serde(deserialize_with = "string_or_number")]
    pub number_proforma: String,

    pub date_proforma: String,

    pub client: String,

    pub address: String,

    #[serde(default)]
    pub total: f64,

    #[serde(default)]
    pub items: Vec<ProformaItemResponse>,
}

/// A resolved line item on a listed proforma
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaItemResponse {
    /// Product name
    pub product: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_string_or_number"
    )]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    pub unit_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_measure: Option<MeasureRef>,
}

impl ProformaItemResponse {
    /// Line amount, when the backend reports the quantity
    pub fn amount(&self) -> Option<f64> {
        self.quantity.map(|q| q as f64 * self.unit_price)
    }
}

impl ProformaResponse {
    /// Sequence number as printed on documents, e.g. `Nº 0007`
    pub fn display_number(&self) -> String {
        format!("Nº {}", self.number_proforma)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Case-insensitive match on client, address or number
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.client.to_lowercase().contains(&term)
            || self.address.to_lowercase().contains(&term)
            || self.number_proforma.to_lowercase().contains(&term)
    }
}

impl Entity for ProformaResponse {
    const CACHE_KEY: &'static str = "proformas";
    const NAME: &'static str = "proforma";

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn title(&self) -> &str {
        &self.client
    }
}

/// One requested line on a new proforma
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaItemDto {
    pub product_id: String,
    pub quantity: u32,
}

/// Payload for `POST /proforma`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProformaDto {
    pub client: String,
    pub address: String,
    pub items: Vec<ProformaItemDto>,
}

impl CreateProformaDto {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.client.trim().is_empty() {
            errors.add("client", "Client is required");
        }
        if self.address.trim().is_empty() {
            errors.add("address", "Address is required");
        }
        if self.items.is_empty() {
            errors.add("items", "Add at least one product");
        }
        for item in &self.items {
            if item.product_id.trim().is_empty() {
                errors.add("items", "Product is required");
            }
            if item.quantity < 1 {
                errors.add("items", format!("Quantity for product {} must be at least 1", item.product_id));
            }
        }
        errors.into_result()
    }
}

/// Response to `POST /proforma`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaCreatedResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(deserialize_with = "string_or_number")]
    pub number_proforma: String,

    pub date_proforma: String,

    pub client: String,

    pub address: String,

    #[serde(default)]
    pub total: f64,

    #[serde(default)]
    pub items: Vec<ProformaItemCreatedResponse>,
}

/// A priced line item on a freshly created proforma
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProformaItemCreatedResponse {
    pub product: String,
    pub quantity: u32,
    pub unit_amount: f64,
    pub subtotal: f64,
}

/// File name for a downloaded proforma PDF: `proforma-0007.pdf`
///
/// Characters that could leave the target directory become `_`.
pub fn pdf_filename(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("proforma-{:0>4}.pdf", safe)
}
