use crate::config::PipelineConfig;
use crate::domain::record::Dataset;
use crate::domain::reporting::DataSourceId;
use crate::error::Result;
use crate::services::availability::AvailabilityWaiter;
use crate::services::fetcher::Fetcher;
use crate::services::publisher::Publisher;
use crate::services::reporting::ReportingClient;
use crate::services::transformer::Transformer;
use crate::services::writer::{write_dataset, WrittenDataset};
use chrono::NaiveDate;
use serde_json::Value;

pub async fn build_dataset(
    fetcher: &Fetcher,
    transformer: &Transformer,
    date: NaiveDate,
) -> Result<Dataset> {
    let mut records = fetcher.fetch_all(date).await?;
    transformer.apply_all(date, &mut records)?;
    Ok(Dataset::new(date, records))
}

pub async fn fetch_to_csv(config: &PipelineConfig, date: NaiveDate) -> Result<WrittenDataset> {
    let fetcher = Fetcher::new(config)?;
    let transformer = Transformer::from_config(config);
    let dataset = build_dataset(&fetcher, &transformer, date).await?;
    write_dataset(config, &dataset)
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub written: WrittenDataset,
    pub file_url: String,
    pub data_source_id: DataSourceId,
    pub report_id: Value,
}

pub struct DailyPipeline<P: Publisher> {
    config: PipelineConfig,
    fetcher: Fetcher,
    transformer: Transformer,
    publisher: P,
    waiter: AvailabilityWaiter,
    reporting: ReportingClient,
}

impl<P: Publisher> DailyPipeline<P> {
    pub fn new(config: PipelineConfig, publisher: P) -> Result<Self> {
        Ok(DailyPipeline {
            fetcher: Fetcher::new(&config)?,
            transformer: Transformer::from_config(&config),
            waiter: AvailabilityWaiter::new(&config.availability)?,
            reporting: ReportingClient::new(&config)?,
            publisher,
            config,
        })
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub async fn run(&self, date: NaiveDate) -> Result<PipelineOutcome> {
        log::info!("Fetching data for {}...", date);
        let dataset = build_dataset(&self.fetcher, &self.transformer, date).await?;
        if dataset.is_empty() {
            log::warn!("No records found for {}; publishing an empty dataset", date);
        }
        let written = write_dataset(&self.config, &dataset)?;

        log::info!("Publishing {}...", written.relative);
        self.publisher.publish(&written.relative).await?;

        let file_url = self.config.raw_url_for(&written.relative);
        match self.register(&file_url).await {
            Ok((data_source_id, report_id)) => {
                log::info!("Report queued with ID: {}", report_id);
                Ok(PipelineOutcome {
                    written,
                    file_url,
                    data_source_id,
                    report_id,
                })
            }
            Err(e) => {
                log::error!("Error occurred: {}", e);
                self.compensate(&written.relative).await;
                Err(e)
            }
        }
    }

    async fn register(&self, file_url: &str) -> Result<(DataSourceId, Value)> {
        self.waiter.wait_for(file_url).await?;

        log::info!("Creating data source...");
        let data_source_id = self.reporting.create_data_source(file_url).await?;
        log::info!("Created data source {}", data_source_id);

        log::info!("Creating report...");
        let report_id = self.reporting.create_report(&data_source_id).await?;
        Ok((data_source_id, report_id))
    }

    async fn compensate(&self, relative: &str) {
        log::info!("Deleting {} from repository due to error...", relative);
        match self.publisher.unpublish(relative).await {
            Ok(()) => log::info!("Successfully removed {} from repository", relative),
            Err(e) => log::warn!("Failed to delete file from repo: {}", e),
        }
    }
}
