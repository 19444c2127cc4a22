//! Product form state
//!
//! Holds raw field input as typed by the user, seeds itself from the
//! product being edited, and turns valid input into a [`CreateProductDto`].

use tracing::debug;

use crate::core::error::{ClientError, ValidationErrors};
use crate::entities::measure::UnitMeasure;
use crate::entities::product::{CreateProductDto, Product};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub sku: String,
    pub unit_measure: String,
    pub category_id: String,

    errors: ValidationErrors,
    seed: Option<Product>,
    pending: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            brand: String::new(),
            model: String::new(),
            description: String::new(),
            price: "0".to_string(),
            stock: "0".to_string(),
            sku: String::new(),
            unit_measure: String::new(),
            category_id: String::new(),
            errors: ValidationErrors::new(),
            seed: None,
            pending: false,
        }
    }
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form seeded from `product`
    pub fn for_product(product: &Product) -> Self {
        let mut form = Self::default();
        form.set_initial_data(Some(product));
        form
    }

    /// Reseed the form
    ///
    /// Every field is reset to the new product's values (or to defaults for
    /// `None`), but only when the seed differs from the one last applied.
    /// Returns whether a reset happened.
    pub fn set_initial_data(&mut self, data: Option<&Product>) -> bool {
        if self.seed.as_ref() == data {
            return false;
        }

        let pending = self.pending;
        *self = match data {
            Some(p) => Self {
                name: p.name.clone(),
                brand: p.brand.clone().unwrap_or_default(),
                model: p.model.clone().unwrap_or_default(),
                description: p.description.clone().unwrap_or_default(),
                price: p.price.to_string(),
                stock: p.stock.map(|s| s.to_string()).unwrap_or_default(),
                sku: p.sku.clone().unwrap_or_default(),
                unit_measure: p.unit().map(|u| u.code().to_string()).unwrap_or_default(),
                category_id: String::new(),
                errors: ValidationErrors::new(),
                seed: Some(p.clone()),
                pending,
            },
            None => Self {
                pending,
                ..Self::default()
            },
        };
        debug!(seed = ?data.and_then(|p| p.product_id.as_deref()), "product form reset");
        true
    }

    /// Restore defaults and drop the seed
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_edit(&self) -> bool {
        self.seed.is_some()
    }

    pub fn seed(&self) -> Option<&Product> {
        self.seed.as_ref()
    }

    /// Editing a product whose stock is not tracked; an empty stock keeps it that way
    pub fn stock_untracked(&self) -> bool {
        self.seed.as_ref().is_some_and(|p| p.stock.is_none())
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.is_edit(), self.pending) {
            (false, false) => "Create Product",
            (true, false) => "Update Product",
            (false, true) => "Creating...",
            (true, true) => "Updating...",
        }
    }

    /// Errors from the last validation
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    /// Check every field and build the payload
    pub fn validate(&mut self) -> Result<CreateProductDto, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let price = match self.price.trim().parse::<f64>() {
            Ok(p) if p.is_finite() && p > 0.0 => p,
            Ok(_) => {
                errors.add("price", "Price must be positive");
                0.0
            }
            Err(_) => {
                errors.add("price", "Price must be a number");
                0.0
            }
        };

        let stock = match self.stock.trim() {
            "" if self.stock_untracked() => None,
            input => match input.parse::<i64>() {
                Ok(s) if s < 0 => {
                    errors.add("stock", "Stock cannot be negative");
                    None
                }
                Ok(s) => match u32::try_from(s) {
                    Ok(s) => Some(s),
                    Err(_) => {
                        errors.add("stock", "Stock is too large");
                        None
                    }
                },
                Err(_) => {
                    errors.add("stock", "Stock must be a whole number");
                    None
                }
            },
        };

        let unit = match self.unit_measure.trim() {
            "" => {
                errors.add("unitMeasure", "Unit of measure is required");
                None
            }
            code => match code.parse::<UnitMeasure>() {
                Ok(unit) => Some(unit),
                Err(e) => {
                    errors.add("unitMeasure", e);
                    None
                }
            },
        };

        self.errors = errors.clone();
        errors.into_result()?;

        let Some(unit_measure) = unit else {
            return Err(self.errors.clone());
        };
        Ok(CreateProductDto {
            name: name.to_string(),
            brand: optional(&self.brand),
            model: optional(&self.model),
            description: optional(&self.description),
            price,
            stock,
            sku: optional(&self.sku),
            unit_measure,
            category_id: optional(&self.category_id),
        })
    }

    /// Validate and hand the payload to `on_submit`
    ///
    /// Invalid input never reaches `on_submit`. While a submission is
    /// pending this is a no-op returning `Ok(None)`.
    pub fn submit<R, F>(&mut self, on_submit: F) -> Result<Option<R>, ClientError>
    where
        F: FnOnce(CreateProductDto) -> Result<R, ClientError>,
    {
        if self.pending {
            debug!("submit ignored while pending");
            return Ok(None);
        }
        let dto = self.validate()?;

        self.pending = true;
        let result = on_submit(dto);
        self.pending = false;
        result.map(Some)
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn hammer() -> Product {
        serde_json::from_value(serde_json::json!({
            "productId": "p-1",
            "name": "Martillo",
            "brand": "Stanley",
            "price": 25.5,
            "stock": 10,
            "measure": "PIEZA"
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let form = ProductForm::new();
        assert_eq!(form.price, "0");
        assert_eq!(form.stock, "0");
        assert!(!form.is_edit());
        assert_eq!(form.submit_label(), "Create Product");
    }

    #[test]
    fn test_seed_fills_fields() {
        let form = ProductForm::for_product(&hammer());
        assert_eq!(form.name, "Martillo");
        assert_eq!(form.brand, "Stanley");
        assert_eq!(form.price, "25.5");
        assert_eq!(form.stock, "10");
        assert_eq!(form.unit_measure, "PIEZA");
        assert_eq!(form.submit_label(), "Update Product");
    }

    #[test]
    fn test_reset_only_on_seed_change() {
        let p = hammer();
        let mut form = ProductForm::new();
        assert!(form.set_initial_data(Some(&p)));

        // User edits survive a re-render with the same seed
        form.name = "Martillo de goma".to_string();
        assert!(!form.set_initial_data(Some(&p)));
        assert_eq!(form.name, "Martillo de goma");

        // Seed cleared: back to defaults
        assert!(form.set_initial_data(None));
        assert_eq!(form.name, "");
        assert!(!form.is_edit());
        assert!(!form.set_initial_data(None));
    }

    #[test]
    fn test_validation_errors_are_field_scoped() {
        let mut form = ProductForm::new();
        form.price = "-3".to_string();
        form.stock = "-1".to_string();
        form.unit_measure = "furlong".to_string();

        let errors = form.validate().unwrap_err();
        assert!(errors.has("name"));
        assert_eq!(errors.get("price"), Some("Price must be positive"));
        assert_eq!(errors.get("stock"), Some("Stock cannot be negative"));
        assert!(errors.has("unitMeasure"));
        assert_eq!(form.field_error("price"), Some("Price must be positive"));
    }

    #[test]
    fn test_untracked_stock_seeds_empty() {
        let mut nail = hammer();
        nail.stock = None;
        let mut form = ProductForm::for_product(&nail);
        assert_eq!(form.stock, "");
        assert!(form.stock_untracked());
        assert_eq!(form.validate().unwrap().stock, None);

        // Without an untracked seed an empty stock is still an error
        let mut form = ProductForm::new();
        form.name = "Clavos".to_string();
        form.price = "1".to_string();
        form.stock = String::new();
        form.unit_measure = "CAJA".to_string();
        assert_eq!(
            form.validate().unwrap_err().get("stock"),
            Some("Stock must be a whole number")
        );
    }

    #[test]
    fn test_non_numeric_input() {
        let mut form = ProductForm::new();
        form.name = "Clavos".to_string();
        form.price = "abc".to_string();
        form.stock = "1.5".to_string();
        form.unit_measure = "CAJA".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("price"), Some("Price must be a number"));
        assert_eq!(errors.get("stock"), Some("Stock must be a whole number"));
    }

    #[test]
    fn test_invalid_input_never_submits() {
        let mut form = ProductForm::new();
        let called = Cell::new(false);
        let result = form.submit(|_| {
            called.set(true);
            Ok(())
        });
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(!called.get());
    }

    #[test]
    fn test_pending_blocks_submit() {
        let mut form = ProductForm::for_product(&hammer());
        form.set_pending(true);
        assert_eq!(form.submit_label(), "Updating...");

        let called = Cell::new(false);
        let result = form.submit(|_| {
            called.set(true);
            Ok(())
        });
        assert!(matches!(result, Ok(None)));
        assert!(!called.get());
    }

    #[test]
    fn test_valid_submit_builds_dto() {
        let mut form = ProductForm::new();
        form.name = " Martillo ".to_string();
        form.price = "25.50".to_string();
        form.stock = "10".to_string();
        form.unit_measure = "pieza".to_string();
        form.brand = "  ".to_string();

        let dto = form.submit(|dto| Ok(dto)).unwrap().unwrap();
        assert_eq!(dto, CreateProductDto::new("Martillo", 25.5, 10, UnitMeasure::Pieza));
        assert!(!form.is_pending());
    }

    #[test]
    fn test_clear() {
        let mut form = ProductForm::for_product(&hammer());
        form.clear();
        assert_eq!(form, ProductForm::new());
    }
}
