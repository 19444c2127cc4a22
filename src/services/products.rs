//! Product service - `/products` endpoints

use std::sync::Arc;
use tracing::info;

use crate::core::entity::Entity;
use crate::core::error::ClientError;
use crate::core::gateway::{resource_path, ApiRequest, Gateway, GatewayExt};
use crate::core::pagination::{PaginatedResponse, PaginationParams};
use crate::core::query::{QueryClient, QueryKey};
use crate::entities::product::{CreateProductDto, Product, UpdateProductDto};
use crate::services::{checked, ListSource};

const PATH: &str = "/products";

/// CRUD access to the product catalog
#[derive(Clone)]
pub struct ProductService {
    gateway: Arc<dyn Gateway>,
    queries: Arc<QueryClient>,
}

impl ProductService {
    pub fn new(gateway: Arc<dyn Gateway>, queries: Arc<QueryClient>) -> Self {
        Self { gateway, queries }
    }

    pub fn queries(&self) -> &Arc<QueryClient> {
        &self.queries
    }

    /// One page of products, served from cache when possible
    pub fn list(
        &self,
        params: &PaginationParams,
    ) -> Result<Arc<PaginatedResponse<Product>>, ClientError> {
        let key = QueryKey::list(Product::CACHE_KEY, params);
        self.queries.fetch(&key, || {
            let page = self
                .gateway
                .get_json(ApiRequest::get(PATH).with_queries(params.to_query()))?;
            checked(PATH, page)
        })
    }

    pub fn get(&self, id: &str) -> Result<Arc<Product>, ClientError> {
        let path = resource_path(PATH, id)?;
        let key = QueryKey::detail(Product::CACHE_KEY, id);
        self.queries
            .fetch(&key, || self.gateway.get_json(ApiRequest::get(path)))
    }

    /// Create a product; invalid payloads never reach the backend
    pub fn create(&self, dto: &CreateProductDto) -> Result<Product, ClientError> {
        dto.validate()?;
        let product: Product = self
            .queries
            .mutate(Product::CACHE_KEY, || self.gateway.post_json(PATH, dto))?;
        info!(id = ?product.id(), name = %product.name, "created product");
        Ok(product)
    }

    /// Apply a partial update
    pub fn update(&self, id: &str, changes: &UpdateProductDto) -> Result<Product, ClientError> {
        changes.validate()?;
        let path = resource_path(PATH, id)?;
        let product: Product = self
            .queries
            .mutate(Product::CACHE_KEY, || self.gateway.put_json(&path, changes))?;
        info!(%id, "updated product");
        Ok(product)
    }

    pub fn delete(&self, id: &str) -> Result<(), ClientError> {
        let path = resource_path(PATH, id)?;
        self.queries
            .mutate(Product::CACHE_KEY, || self.gateway.delete(&path))?;
        info!(%id, "deleted product");
        Ok(())
    }
}

impl ListSource<Product> for ProductService {
    fn list_key(&self, params: &PaginationParams) -> QueryKey {
        QueryKey::list(Product::CACHE_KEY, params)
    }

    fn list(
        &self,
        params: &PaginationParams,
    ) -> Result<Arc<PaginatedResponse<Product>>, ClientError> {
        ProductService::list(self, params)
    }
}
