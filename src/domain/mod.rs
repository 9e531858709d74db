pub mod record;
pub mod reporting;
