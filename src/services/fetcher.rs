use crate::config::{PipelineConfig, DATE_FIELD, ORDER_KEY};
use crate::domain::record::Record;
use crate::error::{PipelineError, Result};
use crate::services::retry::RetryPolicy;
use chrono::NaiveDate;
use reqwest::Client;

pub struct Fetcher {
    client: Client,
    endpoint: String,
    app_token: Option<String>,
    page_size: usize,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Fetcher {
            client,
            endpoint: config.endpoint.clone(),
            app_token: config.app_token.clone(),
            page_size: config.page_size,
            retry: RetryPolicy::from_fetch_settings(&config.fetch_retry),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn fetch_all(&self, date: NaiveDate) -> Result<Vec<Record>> {
        let filter = where_clause(date);
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let batch = self
                .retry
                .run("upstream fetch", PipelineError::is_transient, |_| {
                    self.fetch_page(&filter, offset)
                })
                .await?;

            let batch_len = batch.len();
            if batch_len == 0 {
                break;
            }
            records.extend(batch);
            log::info!("Fetched {} records so far...", records.len());

            if batch_len < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        Ok(records)
    }

    async fn fetch_page(&self, filter: &str, offset: usize) -> Result<Vec<Record>> {
        let params = [
            ("$where", filter.to_string()),
            ("$order", ORDER_KEY.to_string()),
            ("$limit", self.page_size.to_string()),
            ("$offset", offset.to_string()),
        ];

        let mut request = self.client.get(&self.endpoint).query(&params);
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

pub fn where_clause(date: NaiveDate) -> String {
    format!("{}='{}T00:00:00.000'", DATE_FIELD, date.format("%Y-%m-%d"))
}
