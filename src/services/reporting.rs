use crate::config::PipelineConfig;
use crate::domain::reporting::{
    CreateDataSourceRequest, CreatedDataSources, DataSourceId, DataSourceList, DeleteOutcome,
    DeleteRequest, FileSpec, ReportCreated, ReportParams, ReportRequest,
};
use crate::error::{PipelineError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub struct ReportingClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl ReportingClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(ReportingClient {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("X-API-Key", key),
            None => request,
        }
    }

    async fn expect<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
        expected: StatusCode,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if status != expected {
            log::error!("{} failed (status {}): {}", operation, status, body);
            return Err(PipelineError::ReportingStatus {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| {
            PipelineError::MalformedResponse(format!("{}: {} in {}", operation, e, body))
        })
    }

    pub async fn create_data_source(&self, file_url: &str) -> Result<DataSourceId> {
        let name = file_url.rsplit('/').next().unwrap_or(file_url);
        let body = CreateDataSourceRequest {
            files: vec![FileSpec { name, url: file_url }],
        };

        let request = self.authorize(self.client.post(self.url("/v1/data-sources/file/")));
        let response = request.json(&body).send().await?;
        let created: CreatedDataSources =
            Self::expect("Data source creation", response, StatusCode::CREATED).await?;

        created.first_id().cloned().ok_or_else(|| {
            PipelineError::MalformedResponse(
                "data source creation returned no created data source".to_string(),
            )
        })
    }

    pub async fn create_report(&self, data_source_id: &DataSourceId) -> Result<Value> {
        let body = ReportRequest {
            data_sources_ids: vec![data_source_id],
            params: ReportParams::default(),
            improve_prompt: false,
        };

        let request = self.authorize(self.client.post(self.url("/v1/reports/")));
        let response = request.json(&body).send().await?;
        let created: ReportCreated =
            Self::expect("Report creation", response, StatusCode::CREATED).await?;
        Ok(created.id)
    }

    pub async fn list_data_sources(&self) -> Result<DataSourceList> {
        let request = self.authorize(self.client.get(self.url("/v1/data-sources/")));
        let response = request.send().await?;
        Self::expect("Fetching data sources", response, StatusCode::OK).await
    }

    /// Bulk delete. `None` when there was nothing to delete.
    pub async fn delete_data_sources(&self, ids: &[DataSourceId]) -> Result<Option<DeleteOutcome>> {
        if ids.is_empty() {
            log::info!("No data sources to delete");
            return Ok(None);
        }

        let request = self.authorize(self.client.delete(self.url("/v1/data-sources/")));
        let response = request.json(&DeleteRequest { ids }).send().await?;
        let outcome: DeleteOutcome =
            Self::expect("Deleting data sources", response, StatusCode::OK).await?;

        log::info!("Deleted {} data sources", outcome.deleted_count);
        if !outcome.failed_sources.is_empty() {
            log::warn!(
                "Failed to delete: {}",
                Value::Array(outcome.failed_sources.clone())
            );
        }
        Ok(Some(outcome))
    }
}
