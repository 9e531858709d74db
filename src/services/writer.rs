use crate::config::{PipelineConfig, DATASETS_DIR};
use crate::domain::record::{cell_text, Dataset, Record};
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct WrittenDataset {
    pub path: PathBuf,
    pub relative: String,
    pub rows: usize,
}

impl WrittenDataset {
    pub fn file_name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }
}

/// Serializes records using the first record's fields as the header.
/// An empty slice produces an empty output.
pub fn write_records<W: Write>(records: &[Record], writer: W) -> Result<usize> {
    let Some(first) = records.first() else {
        return Ok(0);
    };
    let columns: Vec<&String> = first.keys().collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&columns)?;

    let mut warned = false;
    for record in records {
        if !warned && record.keys().any(|k| !first.contains_key(k)) {
            log::warn!("Some records carry fields missing from the header; they are not written");
            warned = true;
        }
        csv_writer.write_record(
            columns
                .iter()
                .map(|c| record.get(*c).map(cell_text).unwrap_or_default()),
        )?;
    }

    csv_writer.flush()?;
    Ok(records.len())
}

pub fn write_dataset(config: &PipelineConfig, dataset: &Dataset) -> Result<WrittenDataset> {
    let dir = config.datasets_dir();
    fs::create_dir_all(&dir)?;

    let file_name = config.output_filename(dataset.date);
    let path = dir.join(&file_name);
    let file = File::create(&path)?;
    let rows = write_records(&dataset.records, BufWriter::new(file))?;

    log::info!("Saved {} records to {}", rows, path.display());
    Ok(WrittenDataset {
        path,
        relative: format!("{}/{}", DATASETS_DIR, file_name),
        rows,
    })
}

pub fn list_dataset_files(datasets_dir: &Path) -> Result<Vec<String>> {
    if !datasets_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(datasets_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_file() && name.ends_with(".csv") {
            files.push(format!("{}/{}", DATASETS_DIR, name));
        }
    }
    files.sort();
    Ok(files)
}
