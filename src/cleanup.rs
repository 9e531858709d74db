use pagamenti_pipeline::error::PipelineError;
use pagamenti_pipeline::services::cleanup_job::CleanupJob;
use pagamenti_pipeline::services::publisher::GitPublisher;
use pagamenti_pipeline::PipelineConfig;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(true) => log::info!("Weekly cleanup completed successfully!"),
        Ok(false) => {
            eprintln!("Error: weekly cleanup finished with failures");
            process::exit(1);
        }
        Err(e) => {
            log::error!("Weekly cleanup failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<bool, PipelineError> {
    let config = PipelineConfig::from_env()?;
    log::info!("Starting weekly cleanup...");

    let publisher = GitPublisher::new(config.repo_root.clone());
    let job = CleanupJob::new(&config, publisher)?;
    let summary = job.run().await;
    Ok(summary.is_success())
}
