use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://app.southwind.ai/api";
pub const DEFAULT_ENDPOINT: &str = "https://www.dati.lombardia.it/resource/78vt-im2v.json";
pub const DEFAULT_RAW_BASE_URL: &str =
    "https://raw.githubusercontent.com/southwind-ai/lombardia-pagamenti/main/";
pub const DEFAULT_DROP_COLUMNS: &str = "ora,giorno_della_settimana,modello,ultima_modifica_data";
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "pagamenti_{date}.csv";
pub const DATASETS_DIR: &str = "datasets";

pub const DATE_FIELD: &str = "pag_data";
pub const HOUR_FIELD: &str = "ora";
pub const ORDER_KEY: &str = ":id";

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilitySettings {
    pub max_attempts: u32,
    pub interval: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub app_token: Option<String>,
    pub endpoint: String,
    pub drop_columns: IndexSet<String>,
    pub rename_columns: IndexMap<String, String>,
    pub output_template: String,
    pub date: Option<NaiveDate>,
    pub raw_base_url: String,
    pub repo_root: PathBuf,
    pub page_size: usize,
    pub http_timeout: Duration,
    pub fetch_retry: RetrySettings,
    pub availability: AvailabilitySettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            app_token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            drop_columns: parse_drop_columns(DEFAULT_DROP_COLUMNS),
            rename_columns: IndexMap::new(),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            date: None,
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            repo_root: PathBuf::from("."),
            page_size: 1000,
            http_timeout: Duration::from_secs(60),
            fetch_retry: RetrySettings {
                max_attempts: 5,
                backoff_base_secs: 2,
            },
            availability: AvailabilitySettings {
                max_attempts: 10,
                interval: Duration::from_secs(10),
                request_timeout: Duration::from_secs(10),
            },
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = PipelineConfig::default();

        if let Some(v) = get("API_BASE") {
            config.api_base = v;
        }
        config.api_key = get("API_KEY");
        config.app_token = get("APP_TOKEN");
        if let Some(v) = get("ENDPOINT") {
            config.endpoint = v;
        }
        // An explicitly empty DROP_COLUMNS disables dropping.
        if let Some(v) = lookup("DROP_COLUMNS") {
            config.drop_columns = parse_drop_columns(&v);
        }
        if let Some(v) = get("RENAME_COLUMNS") {
            config.rename_columns = parse_rename_columns(&v)?;
        }
        if let Some(v) = get("OUTPUT_FILE") {
            config.output_template = v;
        }
        if !config.output_template.contains("{date}") {
            return Err(PipelineError::Config(format!(
                "OUTPUT_FILE '{}' must contain a {{date}} placeholder",
                config.output_template
            )));
        }
        if let Some(v) = get("DATE") {
            config.date = Some(parse_date(&v)?);
        }
        if let Some(v) = get("RAW_BASE_URL") {
            config.raw_base_url = v;
        }
        config.repo_root = match get("REPO_ROOT") {
            Some(v) => PathBuf::from(v),
            None => std::env::current_dir()?,
        };

        if let Some(v) = get("PAGE_SIZE") {
            config.page_size = parse_number("PAGE_SIZE", &v)?;
            if config.page_size == 0 {
                return Err(PipelineError::Config("PAGE_SIZE must be positive".into()));
            }
        }
        if let Some(v) = get("HTTP_TIMEOUT_SECS") {
            config.http_timeout = Duration::from_secs(parse_number("HTTP_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("FETCH_MAX_ATTEMPTS") {
            config.fetch_retry.max_attempts = parse_attempts("FETCH_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = get("FETCH_BACKOFF_BASE_SECS") {
            config.fetch_retry.backoff_base_secs = parse_number("FETCH_BACKOFF_BASE_SECS", &v)?;
        }
        if let Some(v) = get("AVAILABILITY_MAX_ATTEMPTS") {
            config.availability.max_attempts = parse_attempts("AVAILABILITY_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = get("AVAILABILITY_INTERVAL_SECS") {
            config.availability.interval =
                Duration::from_secs(parse_number("AVAILABILITY_INTERVAL_SECS", &v)?);
        }
        if let Some(v) = get("AVAILABILITY_TIMEOUT_SECS") {
            config.availability.request_timeout =
                Duration::from_secs(parse_number("AVAILABILITY_TIMEOUT_SECS", &v)?);
        }

        Ok(config)
    }

    pub fn with_repo_root(mut self, repo_root: impl Into<PathBuf>) -> Self {
        self.repo_root = repo_root.into();
        self
    }

    pub fn datasets_dir(&self) -> PathBuf {
        self.repo_root.join(DATASETS_DIR)
    }

    pub fn output_filename(&self, date: NaiveDate) -> String {
        self.output_template
            .replace("{date}", &date.format("%Y-%m-%d").to_string())
    }

    pub fn raw_url_for(&self, relative: &str) -> String {
        format!(
            "{}/{}",
            self.raw_base_url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| PipelineError::InvalidDate(value.to_string()))
}

fn parse_drop_columns(value: &str) -> IndexSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_rename_columns(value: &str) -> Result<IndexMap<String, String>> {
    let mut mapping = IndexMap::new();
    for pair in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (old, new) = pair.split_once(':').ok_or_else(|| {
            PipelineError::Config(format!("RENAME_COLUMNS entry '{}' is not old:new", pair))
        })?;
        let (old, new) = (old.trim(), new.trim());
        if old.is_empty() || new.is_empty() {
            return Err(PipelineError::Config(format!(
                "RENAME_COLUMNS entry '{}' has an empty side",
                pair
            )));
        }
        mapping.insert(old.to_string(), new.to_string());
    }
    Ok(mapping)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| PipelineError::Config(format!("{} must be a number, got '{}'", key, value)))
}

fn parse_attempts(key: &str, value: &str) -> Result<u32> {
    let attempts: u32 = parse_number(key, value)?;
    if attempts == 0 {
        return Err(PipelineError::Config(format!("{} must be at least 1", key)));
    }
    Ok(attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            PipelineConfig::from_lookup(lookup_from(&[("REPO_ROOT", "/tmp/repo")])).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.api_key.is_none());
        assert!(config.drop_columns.contains("ora"));
        assert!(config.drop_columns.contains("ultima_modifica_data"));
        assert!(config.rename_columns.is_empty());
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.datasets_dir(), PathBuf::from("/tmp/repo/datasets"));
    }

    #[test]
    fn test_rename_columns_parsing() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("REPO_ROOT", "/tmp/repo"),
            ("RENAME_COLUMNS", "importo:amount, ente : entity,"),
        ]))
        .unwrap();
        assert_eq!(config.rename_columns.get("importo").unwrap(), "amount");
        assert_eq!(config.rename_columns.get("ente").unwrap(), "entity");
    }

    #[test]
    fn test_malformed_rename_fails_fast() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("REPO_ROOT", "/tmp/repo"),
            ("RENAME_COLUMNS", "importo"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_empty_drop_columns_disables_dropping() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("REPO_ROOT", "/tmp/repo"),
            ("DROP_COLUMNS", ""),
        ]))
        .unwrap();
        assert!(config.drop_columns.is_empty());
    }

    #[test]
    fn test_invalid_date_override() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("REPO_ROOT", "/tmp/repo"),
            ("DATE", "09/02/2026"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDate(_)));
    }

    #[test]
    fn test_template_requires_placeholder() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("REPO_ROOT", "/tmp/repo"),
            ("OUTPUT_FILE", "pagamenti.csv"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("REPO_ROOT", "/tmp/repo"),
            ("FETCH_MAX_ATTEMPTS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_output_filename_and_raw_url() {
        let config = PipelineConfig::default();
        let date = parse_date("2026-02-09").unwrap();
        assert_eq!(config.output_filename(date), "pagamenti_2026-02-09.csv");
        assert_eq!(
            config.raw_url_for("datasets/pagamenti_2026-02-09.csv"),
            "https://raw.githubusercontent.com/southwind-ai/lombardia-pagamenti/main/datasets/pagamenti_2026-02-09.csv"
        );
    }
}
