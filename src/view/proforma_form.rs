//! Proforma form state and the product picker overlay
//!
//! Line items are keyed by product id in insertion order, so a product can
//! be on a proforma at most once and removing its line makes it selectable
//! again. Subtotals and the estimated total are computed on read.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::error::{ClientError, ValidationErrors};
use crate::core::pagination::{PaginatedResponse, PaginationParams};
use crate::entities::product::Product;
use crate::entities::proforma::{CreateProformaDto, ProformaItemDto};
use crate::services::ListSource;

/// Page size used by the product picker
pub const PICKER_PAGE_SIZE: u32 = 10;

/// One selected product and its requested quantity
#[derive(Debug, Clone, PartialEq)]
pub struct ProformaLine {
    pub product: Product,
    pub quantity: u32,
}

impl ProformaLine {
    pub fn subtotal(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProformaForm {
    pub client: String,
    pub address: String,
    lines: IndexMap<String, ProformaLine>,
    errors: ValidationErrors,
    pending: bool,
}

impl ProformaForm {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Line items
    // =========================================================================

    /// Append `product` with quantity 1
    ///
    /// Returns false, changing nothing, if the product is already on the
    /// proforma or has no id.
    pub fn select_product(&mut self, product: &Product) -> bool {
        let Some(id) = product.product_id.as_deref() else {
            warn!(name = %product.name, "cannot select a product without an id");
            return false;
        };
        if self.lines.contains_key(id) {
            debug!(%id, "product already selected");
            return false;
        }
        self.lines.insert(
            id.to_string(),
            ProformaLine {
                product: product.clone(),
                quantity: 1,
            },
        );
        true
    }

    /// Remove the line at `index`, preserving the order of the rest
    pub fn remove_item(&mut self, index: usize) -> Option<ProformaLine> {
        self.lines.shift_remove_index(index).map(|(_, line)| line)
    }

    /// Set the quantity of the line at `index`; false if there is no such line
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> bool {
        match self.lines.get_index_mut(index) {
            Some((_, line)) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &ProformaLine> {
        self.lines.values()
    }

    pub fn line(&self, index: usize) -> Option<&ProformaLine> {
        self.lines.get_index(index).map(|(_, line)| line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_selected(&self, product_id: &str) -> bool {
        self.lines.contains_key(product_id)
    }

    /// Ids of the selected products, in line order
    pub fn selected_ids(&self) -> Vec<&str> {
        self.lines.keys().map(String::as_str).collect()
    }

    /// `price × quantity` for the line at `index`
    pub fn subtotal(&self, index: usize) -> Option<f64> {
        self.line(index).map(ProformaLine::subtotal)
    }

    /// Sum of line subtotals; the backend computes the authoritative total
    pub fn estimated_total(&self) -> f64 {
        self.lines.values().map(ProformaLine::subtotal).sum()
    }

    // =========================================================================
    // Submission
    // =========================================================================

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn submit_label(&self) -> &'static str {
        if self.pending {
            "Creating..."
        } else {
            "Create Proforma"
        }
    }

    pub fn to_dto(&self) -> CreateProformaDto {
        CreateProformaDto {
            client: self.client.trim().to_string(),
            address: self.address.trim().to_string(),
            items: self
                .lines
                .iter()
                .map(|(id, line)| ProformaItemDto {
                    product_id: id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }

    pub fn validate(&mut self) -> Result<CreateProformaDto, ValidationErrors> {
        let dto = self.to_dto();
        let result = dto.validate();
        self.errors = result.clone().err().unwrap_or_default();
        result.map(|_| dto)
    }

    /// Validate and hand the payload to `on_submit`; see
    /// [`ProductForm::submit`](crate::view::product_form::ProductForm::submit)
    pub fn submit<R, F>(&mut self, on_submit: F) -> Result<Option<R>, ClientError>
    where
        F: FnOnce(CreateProformaDto) -> Result<R, ClientError>,
    {
        if self.pending {
            return Ok(None);
        }
        let dto = self.validate()?;

        self.pending = true;
        let result = on_submit(dto);
        self.pending = false;
        result.map(Some)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A picker row
#[derive(Debug, Clone, Copy)]
pub struct PickerEntry<'a> {
    pub product: &'a Product,
    /// Already on the proforma; shown disabled
    pub selected: bool,
}

/// Browse overlay listing products to add to a proforma
///
/// Products are fetched only while the overlay is open.
#[derive(Debug, Clone)]
pub struct ProductPicker {
    open: bool,
    page: u32,
    search: String,
    current: Option<Arc<PaginatedResponse<Product>>>,
}

impl Default for ProductPicker {
    fn default() -> Self {
        Self {
            open: false,
            page: 1,
            search: String::new(),
            current: None,
        }
    }
}

impl ProductPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn params(&self) -> PaginationParams {
        PaginationParams::new(self.page, PICKER_PAGE_SIZE)
    }

    pub fn open<S: ListSource<Product>>(&mut self, source: &S) -> Result<(), ClientError> {
        self.open = true;
        self.refresh(source)
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Load the current page; does nothing while closed
    pub fn refresh<S: ListSource<Product>>(&mut self, source: &S) -> Result<(), ClientError> {
        if !self.open {
            return Ok(());
        }
        self.current = Some(source.list(&self.params())?);
        Ok(())
    }

    pub fn next_page<S: ListSource<Product>>(&mut self, source: &S) -> Result<bool, ClientError> {
        if !self.open || !self.current.as_ref().is_some_and(|page| page.has_next()) {
            return Ok(false);
        }
        self.page += 1;
        self.refresh(source)?;
        Ok(true)
    }

    pub fn previous_page<S: ListSource<Product>>(
        &mut self,
        source: &S,
    ) -> Result<bool, ClientError> {
        if !self.open || self.page <= 1 {
            return Ok(false);
        }
        self.page -= 1;
        self.refresh(source)?;
        Ok(true)
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn current(&self) -> Option<&Arc<PaginatedResponse<Product>>> {
        self.current.as_ref()
    }

    /// Products on the current page matching the search by name or brand
    pub fn entries<'a>(&'a self, form: &ProformaForm) -> Vec<PickerEntry<'a>> {
        let Some(ref page) = self.current else {
            return Vec::new();
        };
        page.items
            .iter()
            .filter(|p| p.matches_search(&self.search))
            .map(|product| PickerEntry {
                product,
                selected: product
                    .product_id
                    .as_deref()
                    .is_some_and(|id| form.is_selected(id)),
            })
            .collect()
    }

    /// Add the product with `product_id` to `form` and close
    ///
    /// Returns false if the product is not on the current page or is
    /// already selected; the picker stays open in that case.
    pub fn pick(&mut self, form: &mut ProformaForm, product_id: &str) -> bool {
        let Some(product) = self
            .current
            .as_ref()
            .and_then(|page| page.items.iter().find(|p| p.product_id.as_deref() == Some(product_id)))
            .cloned()
        else {
            return false;
        };
        if !form.select_product(&product) {
            return false;
        }
        self.open = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, price: f64) -> Product {
        serde_json::from_value(serde_json::json!({
            "productId": id, "name": name, "price": price, "stock": 20
        }))
        .unwrap()
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut form = ProformaForm::new();
        let hammer = product("p-1", "Martillo", 25.5);
        assert!(form.select_product(&hammer));
        assert!(!form.select_product(&hammer));
        assert_eq!(form.len(), 1);
        assert_eq!(form.line(0).unwrap().quantity, 1);
    }

    #[test]
    fn test_select_remove_select() {
        let mut form = ProformaForm::new();
        let hammer = product("p-1", "Martillo", 25.5);
        let nails = product("p-2", "Clavos", 3.0);
        form.select_product(&hammer);
        form.select_product(&nails);

        let removed = form.remove_item(0).unwrap();
        assert_eq!(removed.product.name, "Martillo");
        assert!(!form.is_selected("p-1"));
        assert_eq!(form.selected_ids(), ["p-2"]);

        assert!(form.select_product(&hammer));
        assert_eq!(form.selected_ids(), ["p-2", "p-1"]);
    }

    #[test]
    fn test_product_without_id_is_rejected() {
        let mut form = ProformaForm::new();
        let p: Product =
            serde_json::from_value(serde_json::json!({"name": "Nuevo", "price": 1.0})).unwrap();
        assert!(!form.select_product(&p));
        assert!(form.is_empty());
    }

    #[test]
    fn test_subtotals_follow_quantity() {
        let mut form = ProformaForm::new();
        form.select_product(&product("p-1", "Martillo", 25.5));
        form.select_product(&product("p-2", "Clavos", 3.0));

        assert_eq!(form.subtotal(0), Some(25.5));
        assert!(form.set_quantity(0, 4));
        assert_eq!(form.subtotal(0), Some(102.0));
        assert!(form.set_quantity(1, 10));
        assert!((form.estimated_total() - 132.0).abs() < 1e-9);
        assert!(!form.set_quantity(5, 1));
        assert_eq!(form.subtotal(5), None);
    }

    #[test]
    fn test_validation() {
        let mut form = ProformaForm::new();
        let errors = form.validate().unwrap_err();
        assert!(errors.has("client"));
        assert!(errors.has("address"));
        assert!(errors.has("items"));

        form.client = "Juan Pérez".to_string();
        form.address = "Av. Lima 123".to_string();
        form.select_product(&product("p-1", "Martillo", 25.5));
        form.set_quantity(0, 0);
        assert!(form.validate().is_err());

        form.set_quantity(0, 2);
        let dto = form.validate().unwrap();
        assert_eq!(dto.items[0].product_id, "p-1");
        assert_eq!(dto.items[0].quantity, 2);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_submit_label() {
        let mut form = ProformaForm::new();
        assert_eq!(form.submit_label(), "Create Proforma");
        form.set_pending(true);
        assert_eq!(form.submit_label(), "Creating...");
        assert!(matches!(form.submit(|_| Ok(())), Ok(None)));
    }
}
