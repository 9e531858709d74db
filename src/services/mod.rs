pub mod availability;
pub mod cleanup_job;
pub mod fetcher;
pub mod pipeline;
pub mod publisher;
pub mod reporting;
pub mod retry;
pub mod transformer;
pub mod writer;
