//! Structural dataset detectors
//!
//! Each module recognizes one structural pattern. Detectors are independent:
//! they all run over the whole document in a fixed order and nothing
//! arbitrates between them, so one region may be reported more than once.

mod cards;
mod definition_list;
mod grid;
mod list;
mod table;

pub use cards::*;
pub use definition_list::*;
pub use grid::*;
pub use list::*;
pub use table::*;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::ScanConfig;
use crate::dataset::{Dataset, DatasetKind, Row};
use crate::identity::dataset_id;

/// A recognizer for one structural pattern
pub trait Detector: Sync {
    fn kind(&self) -> DatasetKind;

    /// Root candidates this detector is offered
    fn candidates(&self) -> &Selector;

    /// At most one dataset per root; `None` is a miss, not an error
    fn detect(&self, root: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset>;
}

/// Scan order: table, list, grid, definition list, card cluster
pub static DETECTORS: &[&dyn Detector] = &[
    &TableDetector,
    &ListDetector,
    &GridDetector,
    &DefinitionListDetector,
    &CardClusterDetector,
];

/// Run every detector over the document and concatenate the hits
pub fn detect_all(document: &Html, config: &ScanConfig) -> Vec<Dataset> {
    let mut datasets = Vec::new();
    for detector in DETECTORS {
        let before = datasets.len();
        datasets.extend(
            document
                .select(detector.candidates())
                .filter_map(|root| detector.detect(root, config)),
        );
        debug!(
            kind = ?detector.kind(),
            found = datasets.len() - before,
            "detector finished"
        );
    }
    datasets
}

/// Parse a constant selector
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Build a dataset, enforcing the shape every detector promises:
/// at least one header, at least one row with content, and no row
/// keys outside the header set.
pub(crate) fn assemble(
    root: ElementRef<'_>,
    kind: DatasetKind,
    label: String,
    headers: Vec<String>,
    rows: Vec<Row>,
) -> Option<Dataset> {
    if headers.is_empty() {
        return None;
    }
    let rows: Vec<Row> = rows
        .into_iter()
        .filter(|row| row.has_content())
        .filter(|row| row.keys().all(|k| headers.iter().any(|h| h == k)))
        .collect();
    if rows.is_empty() {
        return None;
    }

    Some(Dataset {
        id: dataset_id(root, kind.id_prefix()),
        kind,
        label,
        headers,
        rows,
    })
}

/// Trimmed `aria-label`, if non-empty
pub(crate) fn aria_label(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("aria-label")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
}
