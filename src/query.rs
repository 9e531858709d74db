use pagamenti_pipeline::error::PipelineError;
use pagamenti_pipeline::services::pipeline::fetch_to_csv;
use pagamenti_pipeline::PipelineConfig;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    let Some(date) = config.date else {
        eprintln!("Usage: DATE=YYYY-MM-DD query");
        eprintln!("   or: set DATE=YYYY-MM-DD in .env");
        process::exit(1);
    };

    match fetch_to_csv(&config, date).await {
        Ok(written) => println!("{}", written.relative),
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: PipelineError) -> ! {
    log::error!("Fetch failed: {}", e);
    eprintln!("Error: {}", e);
    process::exit(1);
}
