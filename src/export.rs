//! Dataset serialization: delimited text (CSV) and structured text (JSON)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dataset::Dataset;
use crate::error::ScanError;

/// External representation of a dataset
///
/// Deserializes through [`FromStr`], so `delimited` and `structured` are
/// accepted alongside `csv` and `json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("csv"),
            ExportFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" | "delimited" => Ok(ExportFormat::Csv),
            "json" | "structured" => Ok(ExportFormat::Json),
            other => Err(ScanError::UnknownFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = ScanError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Serialize a dataset in the requested format
pub fn export(dataset: &Dataset, format: ExportFormat) -> Result<String, ScanError> {
    match format {
        ExportFormat::Csv => Ok(to_delimited(dataset)),
        ExportFormat::Json => to_structured(dataset),
    }
}

/// Quote a cell when it holds a comma, a double quote or a newline
fn escape_cell(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header line, then one line per row in header order; missing values
/// are empty
pub fn to_delimited(dataset: &Dataset) -> String {
    let mut lines = Vec::with_capacity(dataset.rows.len() + 1);
    lines.push(
        dataset
            .headers
            .iter()
            .map(|h| escape_cell(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in &dataset.rows {
        lines.push(
            dataset
                .headers
                .iter()
                .map(|h| escape_cell(row.get(h).unwrap_or_default()))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Rows only, pretty-printed, keys in header order
pub fn to_structured(dataset: &Dataset) -> Result<String, ScanError> {
    Ok(serde_json::to_string_pretty(&dataset.rows)?)
}
