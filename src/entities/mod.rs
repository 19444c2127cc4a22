//! Entity type definitions

pub mod measure;
pub mod product;
pub mod proforma;

pub use measure::{MeasureCategory, MeasureRef, UnitMeasure};
pub use product::{CreateProductDto, Product, StockLevel, UpdateProductDto};
pub use proforma::{
    CreateProformaDto, ProformaCreatedResponse, ProformaItemDto, ProformaResponse,
};
