use pagamenti_pipeline::error::PipelineError;
use pagamenti_pipeline::services::pipeline::DailyPipeline;
use pagamenti_pipeline::services::publisher::GitPublisher;
use pagamenti_pipeline::PipelineConfig;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("Daily pipeline failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), PipelineError> {
    let config = PipelineConfig::from_env()?;
    let date = config
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let publisher = GitPublisher::new(config.repo_root.clone());
    let pipeline = DailyPipeline::new(config, publisher)?;
    let outcome = pipeline.run(date).await?;

    log::info!(
        "Published {} ({} rows) as data source {}",
        outcome.file_url,
        outcome.written.rows,
        outcome.data_source_id
    );
    Ok(())
}
