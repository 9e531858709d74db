use crate::config::PipelineConfig;
use crate::domain::reporting::DeleteOutcome;
use crate::error::Result;
use crate::services::publisher::Publisher;
use crate::services::reporting::ReportingClient;
use crate::services::writer::list_dataset_files;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CleanupSummary {
    pub data_sources: Result<Option<DeleteOutcome>>,
    pub datasets: Result<usize>,
}

impl CleanupSummary {
    pub fn is_success(&self) -> bool {
        self.data_sources.is_ok() && self.datasets.is_ok()
    }
}

pub struct CleanupJob<P: Publisher> {
    reporting: ReportingClient,
    publisher: P,
    datasets_dir: PathBuf,
}

impl<P: Publisher> CleanupJob<P> {
    pub fn new(config: &PipelineConfig, publisher: P) -> Result<Self> {
        Ok(CleanupJob {
            reporting: ReportingClient::new(config)?,
            publisher,
            datasets_dir: config.datasets_dir(),
        })
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Runs the API stage then the repository stage. The repository stage
    /// runs even when the API stage failed.
    pub async fn run(&self) -> CleanupSummary {
        log::info!("[1/2] Cleaning up data sources via API...");
        let data_sources = self.cleanup_data_sources().await;
        if let Err(e) = &data_sources {
            log::error!("Error cleaning up data sources: {}", e);
        }

        log::info!("[2/2] Cleaning up datasets from repository...");
        let datasets = self.cleanup_datasets().await;
        if let Err(e) = &datasets {
            log::error!("Error cleaning up datasets: {}", e);
        }

        CleanupSummary {
            data_sources,
            datasets,
        }
    }

    pub async fn cleanup_data_sources(&self) -> Result<Option<DeleteOutcome>> {
        let ids = self.reporting.list_data_sources().await?.ids();
        log::info!("Found {} data sources to delete", ids.len());
        self.reporting.delete_data_sources(&ids).await
    }

    pub async fn cleanup_datasets(&self) -> Result<usize> {
        if !self.datasets_dir.is_dir() {
            log::info!("No datasets folder found locally");
            return Ok(0);
        }

        let files = list_dataset_files(&self.datasets_dir)?;
        if files.is_empty() {
            log::info!("No CSV files to clean up in datasets folder");
            return Ok(0);
        }

        log::info!("Found {} CSV files to clean up", files.len());
        self.publisher.purge(&files).await?;
        log::info!("Successfully cleaned up {} files from repository", files.len());
        Ok(files.len())
    }
}
