//! `<table>` detection
//!
//! Headers come from `thead th` when present, otherwise from the first
//! row's cells. Body rows come from `tbody tr`; when that yields nothing
//! every row except the first is tried instead.

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::{aria_label, assemble, selector, Detector};
use crate::config::ScanConfig;
use crate::dataset::{column_placeholder, Dataset, DatasetKind, Row};
use crate::text::{text_content, truncate_chars};

static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static THEAD_TH: LazyLock<Selector> = LazyLock::new(|| selector("thead th"));
static TBODY_TR: LazyLock<Selector> = LazyLock::new(|| selector("tbody tr"));
static TR: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("th, td"));

pub struct TableDetector;

impl Detector for TableDetector {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Table
    }

    fn candidates(&self) -> &Selector {
        &TABLE
    }

    fn detect(&self, root: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
        extract_table(root, config)
    }
}

/// Extract one table, or `None` when no headers or no rows survive
pub fn extract_table(table: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
    let explicit: Vec<String> = table
        .select(&THEAD_TH)
        .enumerate()
        .map(|(i, th)| header_text(th, i))
        .collect();

    let first_row = table.select(&TR).next();
    let (headers, header_row) = if !explicit.is_empty() {
        (explicit, None)
    } else {
        let first = first_row?;
        let headers: Vec<String> = first
            .select(&CELL)
            .enumerate()
            .map(|(i, cell)| header_text(cell, i))
            .collect();
        (headers, Some(first.id()))
    };
    if headers.is_empty() {
        return None;
    }

    // html5ever wraps loose rows in <tbody>, so the row that supplied the
    // headers has to be skipped explicitly
    let mut rows: Vec<Row> = table
        .select(&TBODY_TR)
        .filter(|tr| Some(tr.id()) != header_row)
        .map(|tr| read_row(tr, &headers))
        .filter(Row::has_content)
        .collect();

    if rows.is_empty() {
        rows = table
            .select(&TR)
            .skip(1)
            .map(|tr| read_row(tr, &headers))
            .filter(Row::has_content)
            .collect();
    }

    let label = aria_label(table)
        .unwrap_or_else(|| truncate_chars(&headers.join(", "), config.label_max_chars));

    assemble(table, DatasetKind::Table, label, headers, rows)
}

fn header_text(cell: ElementRef<'_>, index: usize) -> String {
    let text = text_content(cell);
    if text.is_empty() {
        column_placeholder(index)
    } else {
        text
    }
}

/// One record keyed by every header; surplus cells are dropped and
/// missing ones read as empty
fn read_row(tr: ElementRef<'_>, headers: &[String]) -> Row {
    let mut cells = tr.select(&CELL).map(text_content);
    headers
        .iter()
        .map(|header| (header.clone(), cells.next().unwrap_or_default()))
        .collect()
}
