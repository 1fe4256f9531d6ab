//! Dataset model: the normalized tabular result of one detector hit

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Opaque dataset identity, unique within one scan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DatasetId {
    fn from(s: String) -> Self {
        DatasetId(s)
    }
}

impl From<&str> for DatasetId {
    fn from(s: &str) -> Self {
        DatasetId(s.to_string())
    }
}

/// Which detector produced a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
    Table,
    List,
    Grid,
    DefinitionList,
    Cards,
}

impl DatasetKind {
    /// Prefix used when deriving dataset identities
    pub fn id_prefix(self) -> &'static str {
        match self {
            DatasetKind::Table => "table",
            DatasetKind::List => "list",
            DatasetKind::Grid => "grid",
            DatasetKind::DefinitionList => "definition",
            DatasetKind::Cards => "cards",
        }
    }
}

/// One record: header -> value, in insertion order.
///
/// Inserting an existing key replaces its value and keeps its position, so
/// duplicate headers collapse onto a single key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// At least one non-empty value
    pub fn has_content(&self) -> bool {
        self.values().any(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in &self.cells {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Normalized tabular extraction result
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub id: DatasetId,
    #[serde(rename = "type")]
    pub kind: DatasetKind,
    pub label: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Disposable copy carrying at most `limit` rows
    pub fn preview(&self, limit: usize) -> DatasetPreview {
        DatasetPreview {
            id: self.id.clone(),
            kind: self.kind,
            label: self.label.clone(),
            headers: self.headers.clone(),
            preview_rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }
}

/// Partial snapshot of a dataset; never authoritative
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPreview {
    pub id: DatasetId,
    #[serde(rename = "type")]
    pub kind: DatasetKind,
    pub label: String,
    pub headers: Vec<String>,
    pub preview_rows: Vec<Row>,
}

/// Positional header placeholder, 0-based index in, 1-based label out
pub fn column_placeholder(index: usize) -> String {
    format!("Column {}", index + 1)
}
