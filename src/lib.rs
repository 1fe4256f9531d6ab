//! Heuristic dataset extraction from HTML pages
//!
//! Finds tabular-shaped regions in a document and normalizes each into a
//! dataset of headers and rows:
//! - `<table>` elements
//! - `<ul>` / `<ol>` lists
//! - ARIA grids (`role="grid"` / `role="table"`)
//! - `<dl>` definition lists
//! - clusters of repeated, identically classed cards
//!
//! Datasets live in a scan-scoped registry and can be fetched, relabeled
//! and exported as CSV or JSON. An FFI entry point exposes the same
//! request/response contract to a host.

pub mod config;
pub mod dataset;
pub mod detectors;
pub mod error;
pub mod export;
pub mod ffi;
pub mod identity;
pub mod navigation;
pub mod registry;
pub mod remap;
pub mod scanner;
pub mod scroll;
pub mod text;
pub mod visibility;

pub use config::{ScanConfig, ScrollConfig};
pub use dataset::{Dataset, DatasetId, DatasetKind, DatasetPreview, Row};
pub use error::ScanError;
pub use export::ExportFormat;
pub use registry::{DatasetRegistry, ScanToken};
pub use scanner::{Page, PageScanner, Request, Response};
