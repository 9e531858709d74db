use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const REPORT_LANGUAGE: &str = "italian";
pub const REPORT_CURRENCY: &str = "EUR";
pub const REPORT_PROMPT: &str = "Analizza i dati dei pagamenti effettuati tramite il portale pagamentinlombardia.servizirl.it per il sistema pagoPA nella data odierna.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSourceId(pub Value);

impl fmt::Display for DataSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceRef {
    pub id: DataSourceId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataOrigin {
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
}

#[derive(Debug, Deserialize)]
pub struct DataSourceList {
    #[serde(default)]
    pub data_origins: Vec<DataOrigin>,
}

impl DataSourceList {
    pub fn ids(&self) -> Vec<DataSourceId> {
        self.data_origins
            .iter()
            .flat_map(|origin| origin.data_sources.iter().map(|ds| ds.id.clone()))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteRequest<'a> {
    pub ids: &'a [DataSourceId],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
    #[serde(default)]
    pub failed_sources: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct FileSpec<'a> {
    pub name: &'a str,
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateDataSourceRequest<'a> {
    pub files: Vec<FileSpec<'a>>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedDataSources {
    #[serde(default)]
    pub created_data_origins: Vec<DataOrigin>,
}

impl CreatedDataSources {
    pub fn first_id(&self) -> Option<&DataSourceId> {
        self.created_data_origins
            .first()
            .and_then(|origin| origin.data_sources.first())
            .map(|ds| &ds.id)
    }
}

#[derive(Debug, Serialize)]
pub struct ReportParams {
    pub language: &'static str,
    pub currency: &'static str,
    pub prompt: &'static str,
    pub dataset_info: String,
    pub data_provenance: bool,
}

impl Default for ReportParams {
    fn default() -> Self {
        ReportParams {
            language: REPORT_LANGUAGE,
            currency: REPORT_CURRENCY,
            prompt: REPORT_PROMPT,
            dataset_info: String::new(),
            data_provenance: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportRequest<'a> {
    pub data_sources_ids: Vec<&'a DataSourceId>,
    pub params: ReportParams,
    pub improve_prompt: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReportCreated {
    pub id: Value,
}
