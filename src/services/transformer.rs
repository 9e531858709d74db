use crate::config::{PipelineConfig, DATE_FIELD, HOUR_FIELD};
use crate::domain::record::Record;
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Transformer {
    drop_columns: IndexSet<String>,
    rename_columns: IndexMap<String, String>,
}

impl Transformer {
    pub fn new(drop_columns: IndexSet<String>, rename_columns: IndexMap<String, String>) -> Self {
        Transformer {
            drop_columns,
            rename_columns,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.drop_columns.clone(), config.rename_columns.clone())
    }

    pub fn apply(&self, date: NaiveDate, record: &mut Record) -> Result<()> {
        let hour = hour_of(record)?;
        record.insert(
            DATE_FIELD.to_string(),
            Value::String(format!("{}T{:02}:00:00.000", date.format("%Y-%m-%d"), hour)),
        );

        for column in &self.drop_columns {
            record.shift_remove(column);
        }

        for (old, new) in &self.rename_columns {
            if let Some(value) = record.shift_remove(old) {
                record.insert(new.clone(), value);
            }
        }

        Ok(())
    }

    pub fn apply_all(&self, date: NaiveDate, records: &mut [Record]) -> Result<()> {
        records.iter_mut().try_for_each(|r| self.apply(date, r))
    }
}

fn hour_of(record: &Record) -> Result<u32> {
    let hour = match record.get(HOUR_FIELD) {
        None | Some(Value::Null) => return Ok(0),
        Some(Value::Number(n)) => n.as_u64().and_then(|h| u32::try_from(h).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        Some(_) => None,
    };

    match hour {
        Some(h) if h < 24 => Ok(h),
        _ => Err(PipelineError::Transform(format!(
            "invalid '{}' value {}",
            HOUR_FIELD,
            record.get(HOUR_FIELD).map(Value::to_string).unwrap_or_default()
        ))),
    }
}
