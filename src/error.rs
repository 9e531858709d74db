use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    InvalidDate(String),
    Config(String),
    Transform(String),
    UpstreamStatus {
        status: u16,
        body: String,
    },
    ReportingStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },
    MalformedResponse(String),
    NotAvailable {
        url: String,
        attempts: u32,
    },
    Git {
        command: String,
        detail: String,
    },
    CsvError(csv::Error),
    IoError(std::io::Error),
    HttpError(reqwest::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidDate(value) => write!(
                f,
                "Invalid date '{}'. Use YYYY-MM-DD format (e.g. 2026-02-09)",
                value
            ),
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PipelineError::Transform(msg) => write!(f, "Transform error: {}", msg),
            PipelineError::UpstreamStatus { status, body } => {
                write!(f, "Upstream request failed (status {}): {}", status, body)
            }
            PipelineError::ReportingStatus {
                operation,
                status,
                body,
            } => write!(f, "{} failed (status {}): {}", operation, status, body),
            PipelineError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            PipelineError::NotAvailable { url, attempts } => write!(
                f,
                "{} not reachable after {} attempts",
                url, attempts
            ),
            PipelineError::Git { command, detail } => {
                write!(f, "git command '{}' failed: {}", command, detail)
            }
            PipelineError::CsvError(e) => write!(f, "CSV error: {}", e),
            PipelineError::IoError(e) => write!(f, "I/O error: {}", e),
            PipelineError::HttpError(e) => write!(f, "HTTP error: {}", e),
            PipelineError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::CsvError(e) => Some(e),
            PipelineError::IoError(e) => Some(e),
            PipelineError::HttpError(e) => Some(e),
            PipelineError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::CsvError(err)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::IoError(err)
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::HttpError(err)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::JsonError(err)
    }
}

impl PipelineError {
    /// Connection-level failures and transient HTTP statuses (429, 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::HttpError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            PipelineError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
