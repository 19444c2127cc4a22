//! Proforma assembly, creation and report tests against the in-memory backend

mod common;

use common::{FakeBackend, PDF_BYTES};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use ferre::core::error::{ClientError, ErrorKind};
use ferre::core::gateway::{ApiResponse, Method};
use ferre::core::query::QueryClient;
use ferre::services::{ProductService, ProformaService};
use ferre::view::proforma_form::{ProductPicker, ProformaForm};

fn services(backend: &Arc<FakeBackend>) -> (ProductService, ProformaService) {
    let queries = Arc::new(QueryClient::new());
    (
        ProductService::new(backend.clone(), queries.clone()),
        ProformaService::new(backend.clone(), queries),
    )
}

/// Backend holding one proforma, id "3", built from product "1"
fn backend_with_proforma() -> (Arc<FakeBackend>, ProformaService) {
    let backend = Arc::new(FakeBackend::with_products(2));
    let (_, proformas) = services(&backend);
    let mut form = ProformaForm::new();
    form.client = "Ferretería Central".to_string();
    form.address = "Av. Grau 123".to_string();
    let dto = {
        let mut dto = form.to_dto();
        dto.items.push(ferre::entities::proforma::ProformaItemDto {
            product_id: "1".to_string(),
            quantity: 2,
        });
        dto
    };
    let created = proformas.create(&dto).unwrap();
    assert_eq!(created.id, "3");
    (backend, proformas)
}

// ============================================================================
// Item selection
// ============================================================================

#[test]
fn test_picker_fetches_only_while_open() {
    let backend = Arc::new(FakeBackend::with_products(15));
    let (products, _) = services(&backend);
    let mut picker = ProductPicker::new();

    picker.refresh(&products).unwrap();
    assert!(backend.requests().is_empty());

    picker.open(&products).unwrap();
    assert_eq!(backend.count(Method::Get, "/products"), 1);
    let requests = backend.requests();
    let request = &requests[0];
    assert_eq!(request.query_param("page"), Some("1"));
    assert_eq!(request.query_param("limit"), Some("10"));

    assert!(picker.next_page(&products).unwrap());
    assert_eq!(picker.current().unwrap().items.len(), 5);
    assert!(!picker.next_page(&products).unwrap());

    picker.close();
    assert!(!picker.next_page(&products).unwrap());
    assert!(!picker.previous_page(&products).unwrap());
    assert_eq!(backend.count(Method::Get, "/products"), 2);
}

#[test]
fn test_select_remove_reselect() {
    let backend = Arc::new(FakeBackend::with_products(3));
    let (products, _) = services(&backend);
    let mut form = ProformaForm::new();
    let mut picker = ProductPicker::new();

    picker.open(&products).unwrap();
    assert!(picker.pick(&mut form, "2"));
    assert!(!picker.is_open());

    // Picking the same product again changes nothing
    picker.open(&products).unwrap();
    assert!(!picker.pick(&mut form, "2"));
    assert!(picker.is_open());
    assert_eq!(form.len(), 1);
    let marked: Vec<bool> = picker.entries(&form).iter().map(|e| e.selected).collect();
    assert_eq!(marked, [false, true, false]);

    assert!(picker.pick(&mut form, "3"));
    assert_eq!(form.selected_ids(), ["2", "3"]);

    form.remove_item(0);
    assert_eq!(form.selected_ids(), ["3"]);

    picker.open(&products).unwrap();
    assert!(picker.pick(&mut form, "2"));
    assert_eq!(form.selected_ids(), ["3", "2"]);

    // Served from cache every time
    assert_eq!(backend.count(Method::Get, "/products"), 1);
}

#[test]
fn test_picker_search_filters_current_page() {
    let backend = Arc::new(FakeBackend::new());
    backend.add_product(json!({"name": "Martillo", "brand": "Stanley", "price": 25.5}));
    backend.add_product(json!({"name": "Destornillador", "brand": "Truper", "price": 12.0}));
    backend.add_product(json!({"name": "Alicate", "brand": "Stanley", "price": 30.0}));
    let (products, _) = services(&backend);

    let form = ProformaForm::new();
    let mut picker = ProductPicker::new();
    picker.open(&products).unwrap();

    picker.set_search("stanley");
    let names: Vec<&str> = picker
        .entries(&form)
        .iter()
        .map(|e| e.product.name.as_str())
        .collect();
    assert_eq!(names, ["Martillo", "Alicate"]);

    picker.set_search("DESTOR");
    assert_eq!(picker.entries(&form).len(), 1);
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_create_proforma_with_quantities() {
    let backend = Arc::new(FakeBackend::with_products(3));
    let (products, proformas) = services(&backend);

    let mut form = ProformaForm::new();
    form.client = "Juan Pérez".to_string();
    form.address = "Jr. Lima 456".to_string();
    form.select_product(&products.get("2").unwrap());
    form.select_product(&products.get("3").unwrap());
    form.set_quantity(0, 4);

    assert_eq!(form.subtotal(0), Some(8.0));
    assert_eq!(form.estimated_total(), 11.0);

    let created = form
        .submit(|dto| proformas.create(&dto))
        .unwrap()
        .unwrap();
    assert_eq!(created.client, "Juan Pérez");
    assert_eq!(created.total, 11.0);
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].quantity, 4);
    assert_eq!(created.items[0].subtotal, 8.0);

    let post = backend
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Post)
        .unwrap();
    assert_eq!(
        post.body,
        Some(json!({
            "client": "Juan Pérez",
            "address": "Jr. Lima 456",
            "items": [
                {"productId": "2", "quantity": 4},
                {"productId": "3", "quantity": 1}
            ]
        }))
    );
    assert_eq!(proformas_invalidations(&products), 1);
}

fn proformas_invalidations(products: &ProductService) -> u64 {
    products.queries().invalidation_count("proformas")
}

#[test]
fn test_empty_proforma_is_rejected_locally() {
    let backend = Arc::new(FakeBackend::with_products(1));
    let (_, proformas) = services(&backend);

    let mut form = ProformaForm::new();
    form.client = "Juan".to_string();
    let err = form.submit(|dto| proformas.create(&dto)).unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert!(errors.has("address"));
    assert_eq!(errors.get("items"), Some("Add at least one product"));
    assert!(backend.requests().is_empty());
}

#[test]
fn test_created_proforma_appears_in_list() {
    let (backend, proformas) = backend_with_proforma();

    let page = proformas
        .list(&ferre::core::pagination::PaginationParams::new(1, 10))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    let listed = &page.items[0];
    assert_eq!(listed.display_number(), "Nº 0001");
    assert_eq!(listed.client, "Ferretería Central");
    assert_eq!(listed.items[0].amount(), Some(2.0));
    assert_eq!(backend.count(Method::Get, "/proforma"), 1);
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_pdf_download_is_named_and_complete() {
    let (backend, proformas) = backend_with_proforma();
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("reports");

    let path = proformas.download_pdf("3", &dir).unwrap();
    assert_eq!(path, dir.join("proforma-0003.pdf"));
    assert_eq!(fs::read(&path).unwrap(), PDF_BYTES);

    let request = backend
        .requests()
        .into_iter()
        .find(|r| r.path == "/reports/proforma/3/pdf")
        .unwrap();
    assert_eq!(request.accept.mime(), "application/pdf");
}

#[test]
fn test_failed_download_leaves_no_file() {
    let (backend, proformas) = backend_with_proforma();
    let tmp = TempDir::new().unwrap();

    let err = proformas.download_pdf("42", tmp.path()).unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 404, .. }));

    backend.respond(Method::Get, "/reports/proforma/3/pdf", ApiResponse::new(200, ""));
    let err = proformas.download_pdf("3", tmp.path()).unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));

    backend.set_offline(true);
    let err = proformas.download_pdf("3", tmp.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);

    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn test_preview_html() {
    let (_, proformas) = backend_with_proforma();
    let html = proformas.preview_html("3").unwrap();
    assert!(html.contains("<h1>Proforma 3</h1>"));
}
