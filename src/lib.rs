pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
