//! REST client for the HR backend.

use crate::api::{ApiError, EmployeeSource};
use crate::config::ApiConfig;
use crate::models::{Company, EmployeeRecord, HierarchyEntry, Page};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Typed client over the backend's REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    employees_path: String,
    area_param: String,
    timeout_seconds: u64,
}

impl ApiClient {
    /// Create a client from the `[api]` configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            employees_path: config.employees_path.clone(),
            area_param: config.area_param.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Base URL requests are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    ApiError::Connect(self.base_url.clone())
                } else {
                    ApiError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        response.json::<T>().await.map_err(|e| ApiError::Decode {
            url,
            message: e.to_string(),
        })
    }

    /// List the companies known to the backend.
    pub async fn companies(&self) -> Result<Vec<Company>, ApiError> {
        self.get_json("/hierarquia/empresas", &[]).await
    }

    /// Resolve a company id, defaulting to the first company listed.
    pub async fn resolve_company(&self, company_id: Option<&str>) -> Result<String, ApiError> {
        if let Some(id) = company_id {
            return Ok(id.to_string());
        }

        let company = self
            .companies()
            .await?
            .into_iter()
            .next()
            .ok_or(ApiError::NoCompany)?;
        info!("No company given, using {} ({})", company.name, company.id);

        Ok(company.id)
    }

    /// Flattened hierarchy path of every area of a company.
    pub async fn hierarchy(&self, company_id: &str) -> Result<Vec<HierarchyEntry>, ApiError> {
        self.get_json(&format!("/hierarquia/empresas/{}/areas", company_id), &[])
            .await
    }
}

impl EmployeeSource for ApiClient {
    async fn fetch_page(
        &self,
        area_id: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Page<EmployeeRecord>, ApiError> {
        let query = [
            (self.area_param.as_str(), area_id.to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ];
        self.get_json(&self.employees_path, &query).await
    }
}
