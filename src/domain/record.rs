use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::Value;

// field order follows the upstream JSON object
pub type Record = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub date: NaiveDate,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(date: NaiveDate, records: Vec<Record>) -> Self {
        Dataset { date, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
