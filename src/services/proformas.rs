//! Proforma service - `/proforma` endpoints and report downloads

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::core::entity::Entity;
use crate::core::error::ClientError;
use crate::core::gateway::{resource_path, Accept, ApiRequest, Gateway, GatewayExt};
use crate::core::pagination::{PaginatedResponse, PaginationParams};
use crate::core::query::{QueryClient, QueryKey};
use crate::entities::proforma::{
    pdf_filename, CreateProformaDto, ProformaCreatedResponse, ProformaResponse,
};
use crate::services::{checked, ListSource};

const PATH: &str = "/proforma";
const REPORTS: &str = "/reports/proforma";

/// Access to proformas and their rendered reports
#[derive(Clone)]
pub struct ProformaService {
    gateway: Arc<dyn Gateway>,
    queries: Arc<QueryClient>,
}

impl ProformaService {
    pub fn new(gateway: Arc<dyn Gateway>, queries: Arc<QueryClient>) -> Self {
        Self { gateway, queries }
    }

    pub fn list(
        &self,
        params: &PaginationParams,
    ) -> Result<Arc<PaginatedResponse<ProformaResponse>>, ClientError> {
        let key = QueryKey::list(ProformaResponse::CACHE_KEY, params);
        self.queries.fetch(&key, || {
            let page = self
                .gateway
                .get_json(ApiRequest::get(PATH).with_queries(params.to_query()))?;
            checked(PATH, page)
        })
    }

    pub fn get(&self, id: &str) -> Result<Arc<ProformaResponse>, ClientError> {
        let path = resource_path(PATH, id)?;
        let key = QueryKey::detail(ProformaResponse::CACHE_KEY, id);
        self.queries
            .fetch(&key, || self.gateway.get_json(ApiRequest::get(path)))
    }

    pub fn create(&self, dto: &CreateProformaDto) -> Result<ProformaCreatedResponse, ClientError> {
        dto.validate()?;
        let created: ProformaCreatedResponse = self
            .queries
            .mutate(ProformaResponse::CACHE_KEY, || self.gateway.post_json(PATH, dto))?;
        info!(id = %created.id, number = %created.number_proforma, "created proforma");
        Ok(created)
    }

    /// Download the rendered PDF into `dir` as `proforma-XXXX.pdf`
    ///
    /// The body is written to a temporary file in `dir` and renamed into
    /// place only once complete, so a failed download leaves nothing behind.
    pub fn download_pdf(&self, id: &str, dir: &Path) -> Result<PathBuf, ClientError> {
        let path = format!("{}/pdf", resource_path(REPORTS, id)?);
        let bytes = self.gateway.get_bytes(&path, Accept::Pdf)?;
        if bytes.is_empty() {
            return Err(ClientError::Decode {
                path,
                message: "empty PDF document".to_string(),
            });
        }

        let target = dir.join(pdf_filename(id));
        write_atomic(dir, &target, &bytes)?;
        info!(%id, path = %target.display(), bytes = bytes.len(), "saved proforma PDF");
        Ok(target)
    }

    /// HTML preview of a proforma
    pub fn preview_html(&self, id: &str) -> Result<String, ClientError> {
        let path = format!("{}/preview", resource_path(REPORTS, id)?);
        self.gateway.get_text(&path, Accept::Html)
    }
}

impl ListSource<ProformaResponse> for ProformaService {
    fn list_key(&self, params: &PaginationParams) -> QueryKey {
        QueryKey::list(ProformaResponse::CACHE_KEY, params)
    }

    fn list(
        &self,
        params: &PaginationParams,
    ) -> Result<Arc<PaginatedResponse<ProformaResponse>>, ClientError> {
        ProformaService::list(self, params)
    }
}

fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), ClientError> {
    fs::create_dir_all(dir).map_err(|e| ClientError::io(dir, e))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ClientError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| ClientError::io(target, e))?;
    tmp.persist(target)
        .map_err(|e| ClientError::io(target, e.error))?;
    Ok(())
}
