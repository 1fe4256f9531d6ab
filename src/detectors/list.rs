//! `<ul>` / `<ol>` detection

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::{aria_label, assemble, selector, Detector};
use crate::config::ScanConfig;
use crate::dataset::{Dataset, DatasetKind, Row};
use crate::text::{rendered_text, text_content};

static LIST: LazyLock<Selector> = LazyLock::new(|| selector("ul, ol"));

/// Direct children that count as list items
const ITEM_TAGS: &[&str] = &["li", "article", "div"];

const ITEM_HEADER: &str = "Item";
const FALLBACK_LABEL: &str = "List Items";

pub struct ListDetector;

impl Detector for ListDetector {
    fn kind(&self) -> DatasetKind {
        DatasetKind::List
    }

    fn candidates(&self) -> &Selector {
        &LIST
    }

    fn detect(&self, root: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
        extract_list(root, config)
    }
}

/// One row per item under a single `Item` header; fewer than
/// `min_list_items` qualifying children is not list-shaped data
pub fn extract_list(list: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
    let items: Vec<ElementRef<'_>> = list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| ITEM_TAGS.contains(&child.value().name()))
        .collect();
    if items.len() < config.min_list_items {
        return None;
    }

    let rows: Vec<Row> = items
        .into_iter()
        .map(|item| [(ITEM_HEADER, rendered_text(item))].into_iter().collect::<Row>())
        .collect();

    assemble(
        list,
        DatasetKind::List,
        list_label(list),
        vec![ITEM_HEADER.to_string()],
        rows,
    )
}

fn list_label(list: ElementRef<'_>) -> String {
    aria_label(list)
        .or_else(|| {
            list.prev_siblings()
                .find_map(ElementRef::wrap)
                .map(text_content)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| FALLBACK_LABEL.to_string())
}
