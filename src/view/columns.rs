//! Column sets for the product and proforma tables

use crate::entities::product::{Product, StockLevel};
use crate::entities::proforma::ProformaResponse;
use crate::view::table::Column;

/// `S/ 25.50`
pub fn format_money(currency: &str, amount: f64) -> String {
    format!("{} {:.2}", currency, amount)
}

pub fn stock_label(product: &Product) -> String {
    match (product.stock, product.stock_level()) {
        (None, _) => "-".to_string(),
        (Some(n), StockLevel::Healthy) => n.to_string(),
        (Some(n), level) => format!("{} ({})", n, level),
    }
}

pub fn product_columns(currency: &str) -> Vec<Column<Product>> {
    let currency = currency.to_string();
    vec![
        Column::new("id", "ID", |p: &Product| {
            p.product_id.clone().unwrap_or_default()
        }),
        Column::new("name", "NAME", |p: &Product| p.name.clone()),
        Column::new("brand", "BRAND", |p: &Product| {
            p.brand.clone().unwrap_or_default()
        }),
        Column::new("price", "PRICE", move |p: &Product| {
            format_money(&currency, p.price)
        })
        .numeric(|p: &Product| p.price),
        Column::new("stock", "STOCK", stock_label)
            .numeric(|p: &Product| p.stock.map_or(-1.0, |s| s as f64)),
        Column::new("unit", "UNIT", |p: &Product| p.measure_label()),
        Column::new("sku", "SKU", |p: &Product| p.sku.clone().unwrap_or_default()),
    ]
}

pub fn proforma_columns(currency: &str) -> Vec<Column<ProformaResponse>> {
    let currency = currency.to_string();
    vec![
        Column::new("id", "ID", |p: &ProformaResponse| p.id.clone()),
        Column::new("number", "NUMBER", |p: &ProformaResponse| p.display_number()),
        Column::new("date", "DATE", |p: &ProformaResponse| p.date_proforma.clone()),
        Column::new("client", "CLIENT", |p: &ProformaResponse| p.client.clone()),
        Column::new("address", "ADDRESS", |p: &ProformaResponse| p.address.clone()),
        Column::new("items", "ITEMS", |p: &ProformaResponse| {
            match p.item_count() {
                1 => "1 product".to_string(),
                n => format!("{} products", n),
            }
        })
        .numeric(|p: &ProformaResponse| p.item_count() as f64),
        Column::new("total", "TOTAL", move |p: &ProformaResponse| {
            format_money(&currency, p.total)
        })
        .numeric(|p: &ProformaResponse| p.total),
    ]
}

/// Footer figures for a page of products
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventorySummary {
    pub count: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    /// Sum of price × stock over rows that track stock
    pub value: f64,
}

pub fn inventory_summary<'a>(products: impl IntoIterator<Item = &'a Product>) -> InventorySummary {
    let mut summary = InventorySummary {
        count: 0,
        low_stock: 0,
        out_of_stock: 0,
        value: 0.0,
    };
    for p in products {
        summary.count += 1;
        summary.value += p.inventory_value();
        match p.stock_level() {
            StockLevel::Low => summary.low_stock += 1,
            StockLevel::Out => summary.out_of_stock += 1,
            StockLevel::Healthy | StockLevel::Untracked => {}
        }
    }
    summary
}
