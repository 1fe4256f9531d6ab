//! ARIA grid detection (`role="grid"` / `role="table"`)

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::{aria_label, assemble, selector, Detector};
use crate::config::ScanConfig;
use crate::dataset::{column_placeholder, Dataset, DatasetKind, Row};
use crate::text::text_content;

static GRID: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[role="grid"], [role="table"]"#));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector(r#"[role="row"]"#));
static COLUMN_HEADER: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[role="columnheader"]"#));
static CELL: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"[role="cell"], [role="gridcell"], [role="columnheader"]"#)
});

const FALLBACK_LABEL: &str = "ARIA Grid";

pub struct GridDetector;

impl Detector for GridDetector {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Grid
    }

    fn candidates(&self) -> &Selector {
        &GRID
    }

    fn detect(&self, root: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
        extract_grid(root, config)
    }
}

/// Extract an ARIA grid. Column headers are also cells, so a header row
/// comes back as a row of its own.
pub fn extract_grid(grid: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
    let row_elements: Vec<ElementRef<'_>> = grid.select(&ROW).collect();
    if row_elements.len() < config.min_grid_rows {
        return None;
    }

    let mut headers: Vec<String> = grid
        .select(&COLUMN_HEADER)
        .enumerate()
        .map(|(i, cell)| {
            let text = text_content(cell);
            if text.is_empty() {
                column_placeholder(i)
            } else {
                text
            }
        })
        .collect();

    let cell_rows: Vec<Vec<String>> = row_elements
        .iter()
        .map(|row| row.select(&CELL).map(text_content).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();
    if cell_rows.is_empty() {
        return None;
    }

    if headers.is_empty() {
        let widest = cell_rows.iter().map(Vec::len).max().unwrap_or(0);
        headers = (0..widest).map(column_placeholder).collect();
    }

    // cells past the last header have no column to land in
    let rows: Vec<Row> = cell_rows
        .into_iter()
        .map(|cells| headers.iter().cloned().zip(cells).collect::<Row>())
        .collect();

    let label = aria_label(grid).unwrap_or_else(|| FALLBACK_LABEL.to_string());
    assemble(grid, DatasetKind::Grid, label, headers, rows)
}
