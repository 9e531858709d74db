use crate::config::AvailabilitySettings;
use crate::error::{PipelineError, Result};
use crate::services::retry::RetryPolicy;
use reqwest::{Client, StatusCode};

pub struct AvailabilityWaiter {
    client: Client,
    retry: RetryPolicy,
}

impl AvailabilityWaiter {
    pub fn new(settings: &AvailabilitySettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(AvailabilityWaiter {
            client,
            retry: RetryPolicy::from_availability_settings(settings),
        })
    }

    pub async fn wait_for(&self, url: &str) -> Result<()> {
        let max_attempts = self.retry.max_attempts;
        self.retry
            .run("availability check", |_| true, |attempt| async move {
                log::info!("Checking {} (attempt {}/{})", url, attempt, max_attempts);
                let response = self.client.get(url).send().await?;
                match response.status() {
                    StatusCode::OK => Ok(()),
                    status => Err(PipelineError::UpstreamStatus {
                        status: status.as_u16(),
                        body: String::new(),
                    }),
                }
            })
            .await
            .map_err(|e| {
                log::error!("Giving up on {}: {}", url, e);
                PipelineError::NotAvailable {
                    url: url.to_string(),
                    attempts: max_attempts,
                }
            })?;

        log::info!("{} is available", url);
        Ok(())
    }
}
