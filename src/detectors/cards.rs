//! Repeated-card cluster detection
//!
//! Not anchored to a tag: any `section`, `main` or `div` whose children
//! repeat one exact class string enough times is treated as a list of
//! cards. The dominant class is the first one (in first-seen order) that
//! reaches the repeat threshold, not the most frequent. This is a loose
//! heuristic and over- and under-matches by nature.

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::{assemble, selector, Detector};
use crate::config::ScanConfig;
use crate::dataset::{Dataset, DatasetKind, Row};
use crate::text::{normalize_opt, rendered_text};

static CONTAINER: LazyLock<Selector> = LazyLock::new(|| selector("section, main, div"));

const CONTENT_HEADER: &str = "Content";

pub struct CardClusterDetector;

impl Detector for CardClusterDetector {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Cards
    }

    fn candidates(&self) -> &Selector {
        &CONTAINER
    }

    fn detect(&self, root: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
        extract_card_cluster(root, config)
    }
}

/// Normalized class attribute, the grouping key for cards
fn class_key(element: ElementRef<'_>) -> String {
    normalize_opt(element.value().attr("class"))
}

/// First class string shared by at least `min_repeats` children
pub fn dominant_class(children: &[ElementRef<'_>], min_repeats: usize) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for child in children {
        let key = class_key(*child);
        if key.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
        .into_iter()
        .find(|(_, n)| *n >= min_repeats)
        .map(|(k, _)| k)
}

/// At most one cluster per container
pub fn extract_card_cluster(container: ElementRef<'_>, config: &ScanConfig) -> Option<Dataset> {
    let children: Vec<ElementRef<'_>> = container.children().filter_map(ElementRef::wrap).collect();
    if children.len() < config.card_min_children || children.len() > config.card_max_children {
        return None;
    }

    let class_name = dominant_class(&children, config.card_min_repeats)?;
    let rows: Vec<Row> = children
        .into_iter()
        .filter(|child| class_key(*child) == class_name)
        .map(|card| [(CONTENT_HEADER, rendered_text(card))].into_iter().collect::<Row>())
        .collect();

    assemble(
        container,
        DatasetKind::Cards,
        format!("Repeated cards ({})", class_name),
        vec![CONTENT_HEADER.to_string()],
        rows,
    )
}
