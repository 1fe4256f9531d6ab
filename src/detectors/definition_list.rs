//! `<dl>` detection

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::{assemble, selector, Detector};
use crate::config::ScanConfig;
use crate::dataset::{Dataset, DatasetKind, Row};
use crate::text::text_content;

static DL: LazyLock<Selector> = LazyLock::new(|| selector("dl"));
static DT: LazyLock<Selector> = LazyLock::new(|| selector("dt"));
static DD: LazyLock<Selector> = LazyLock::new(|| selector("dd"));

const TERM: &str = "Term";
const DEFINITION: &str = "Definition";

pub struct DefinitionListDetector;

impl Detector for DefinitionListDetector {
    fn kind(&self) -> DatasetKind {
        DatasetKind::DefinitionList
    }

    fn candidates(&self) -> &Selector {
        &DL
    }

    fn detect(&self, root: ElementRef<'_>, _config: &ScanConfig) -> Option<Dataset> {
        extract_definition_list(root)
    }
}

/// Pair the n-th `<dt>` with the n-th `<dd>`; the shorter sequence wins
pub fn extract_definition_list(dl: ElementRef<'_>) -> Option<Dataset> {
    let terms: Vec<String> = dl.select(&DT).map(text_content).collect();
    let definitions: Vec<String> = dl.select(&DD).map(text_content).collect();
    if terms.is_empty() || definitions.is_empty() {
        return None;
    }

    let rows: Vec<Row> = terms
        .into_iter()
        .zip(definitions)
        .map(|(term, definition)| {
            [(TERM, term), (DEFINITION, definition)].into_iter().collect::<Row>()
        })
        .collect();

    assemble(
        dl,
        DatasetKind::DefinitionList,
        "Definition List".to_string(),
        vec![TERM.to_string(), DEFINITION.to_string()],
        rows,
    )
}
