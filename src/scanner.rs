//! Page scanner and request dispatch
//!
//! [`PageScanner`] owns the registry and answers the message contract the
//! host speaks: scan, fetch, header edit, export, context snapshot,
//! "click next" and auto-scroll. Every request produces a [`Response`]; failures are
//! values, never panics.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{info, warn};
use url::Url;

use crate::config::ScanConfig;
use crate::dataset::{Dataset, DatasetId, Row};
use crate::detectors::{detect_all, selector};
use crate::error::ScanError;
use crate::export::{export, ExportFormat};
use crate::navigation::{plan_next_step, NextStep};
use crate::registry::{DatasetRegistry, ScanToken};
use crate::remap::remap_headers;
use crate::scroll::{self, ScrollOptions, ScrollReport, ScrollSurface};
use crate::text::{rendered_text, truncate_chars};

static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

/// The document a request runs against
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub url: Option<Url>,
}

impl Page {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Result of one scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan: ScanToken,
    pub timestamp: i64,
    pub datasets: Vec<Dataset>,
}

/// Headers after an edit, with a preview of the re-keyed rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderUpdate {
    pub id: DatasetId,
    pub headers: Vec<String>,
    pub preview_rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOptions {
    pub max_length: Option<usize>,
}

/// Requests understood by the scanner, tagged by `action`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ScanPage,
    GetDataset {
        id: DatasetId,
        #[serde(default)]
        scan: Option<ScanToken>,
    },
    UpdateHeaders {
        id: DatasetId,
        #[serde(default)]
        headers: Vec<String>,
        #[serde(default)]
        scan: Option<ScanToken>,
    },
    CopyDataset {
        id: DatasetId,
        /// Parsed at dispatch so an unknown name is an `UnknownFormat` failure
        #[serde(default)]
        format: Option<String>,
        #[serde(default)]
        scan: Option<ScanToken>,
    },
    GetContextSnapshot {
        #[serde(default)]
        options: SnapshotOptions,
    },
    ClickNext,
    AutoScroll {
        #[serde(default)]
        options: ScrollOptions,
    },
}

impl Request {
    /// Parse a request; unknown actions become `None`
    pub fn from_json(json: &str) -> Result<Option<Request>, ScanError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ScanError::InvalidRequest(e.to_string()))?;
        let known = matches!(
            value.get("action").and_then(|a| a.as_str()),
            Some(
                "scanPage"
                    | "getDataset"
                    | "updateHeaders"
                    | "copyDataset"
                    | "getContextSnapshot"
                    | "clickNext"
                    | "autoScroll"
            )
        );
        if !known {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ScanError::InvalidRequest(e.to_string()))
    }
}

/// Payload of a successful response
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Scan(ScanReport),
    Dataset { dataset: Dataset },
    Headers { dataset: HeaderUpdate },
    Export { format: ExportFormat, content: String },
    Context { context: String },
    Next(NextStep),
    Scroll { result: ScrollReport },
}

/// `{"success": true, ...payload}` or `{"success": false, "error": "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Option<Payload>,
}

impl Response {
    pub fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            error: None,
            payload: Some(payload),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            payload: None,
        }
    }
}

impl From<Result<Payload, ScanError>> for Response {
    fn from(result: Result<Payload, ScanError>) -> Self {
        match result {
            Ok(payload) => Response::ok(payload),
            Err(e) => Response::failure(e.to_string()),
        }
    }
}

/// Scanner state: configuration plus the scan-scoped registry
#[derive(Debug, Default)]
pub struct PageScanner {
    config: ScanConfig,
    registry: DatasetRegistry,
}

impl PageScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            registry: DatasetRegistry::new(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Clear the registry, run every detector, register the results
    pub fn scan(&mut self, document: &Html) -> ScanReport {
        let scan = self.registry.begin_scan();
        let mut datasets = detect_all(document, &self.config);
        for dataset in &mut datasets {
            self.registry.put_unique(dataset);
        }
        info!(scan = scan.0, datasets = datasets.len(), "page scanned");

        ScanReport {
            scan,
            timestamp: chrono::Utc::now().timestamp_millis(),
            datasets,
        }
    }

    /// Canonical dataset by id
    pub fn dataset(&self, id: &DatasetId, scan: Option<ScanToken>) -> Result<&Dataset, ScanError> {
        self.registry
            .check_token(id, scan)
            .and_then(|_| self.registry.get(id))
            .inspect_err(|e| warn!(%id, error = %e, "dataset lookup failed"))
    }

    /// Rename a dataset's headers in the registry
    pub fn update_headers(
        &mut self,
        id: &DatasetId,
        headers: &[String],
        scan: Option<ScanToken>,
    ) -> Result<HeaderUpdate, ScanError> {
        self.dataset(id, scan)?;
        let preview_rows = self.config.preview_rows;
        let dataset = remap_headers(self.registry.get_mut(id)?, headers);
        Ok(HeaderUpdate {
            id: dataset.id.clone(),
            headers: dataset.headers.clone(),
            preview_rows: dataset.rows.iter().take(preview_rows).cloned().collect(),
        })
    }

    /// Serialize a registered dataset
    pub fn export(
        &self,
        id: &DatasetId,
        format: ExportFormat,
        scan: Option<ScanToken>,
    ) -> Result<String, ScanError> {
        export(self.dataset(id, scan)?, format)
    }

    /// Rendered body text, capped at `max_chars`
    pub fn context_snapshot(&self, document: &Html, max_chars: Option<usize>) -> String {
        let text = document
            .select(&BODY)
            .next()
            .map(rendered_text)
            .unwrap_or_default();
        truncate_chars(&text, max_chars.unwrap_or(self.config.context_max_chars))
    }

    /// Answer one request against the given page
    pub fn handle(&mut self, page: &Page, request: Request) -> Response {
        let result = match request {
            Request::ScanPage => Ok(Payload::Scan(self.scan(&page.parse()))),
            Request::GetDataset { id, scan } => self
                .dataset(&id, scan)
                .map(|d| Payload::Dataset { dataset: d.clone() }),
            Request::UpdateHeaders { id, headers, scan } => self
                .update_headers(&id, &headers, scan)
                .map(|dataset| Payload::Headers { dataset }),
            Request::CopyDataset { id, format, scan } => format
                .as_deref()
                .map_or(Ok(ExportFormat::default()), str::parse)
                .and_then(|format| {
                    self.export(&id, format, scan)
                        .map(|content| Payload::Export { format, content })
                }),
            Request::GetContextSnapshot { options } => Ok(Payload::Context {
                context: self.context_snapshot(&page.parse(), options.max_length),
            }),
            Request::ClickNext => plan_next_step(&page.parse(), page.url.as_ref())
                .map(Payload::Next)
                .ok_or(ScanError::NoNextControl),
            Request::AutoScroll { .. } => Err(ScanError::NoScrollSurface),
        };

        result.into()
    }

    /// Parse and answer a JSON request
    pub fn handle_json(&mut self, page: &Page, request_json: &str) -> Response {
        match Request::from_json(request_json) {
            Ok(Some(request)) => self.handle(page, request),
            Ok(None) => Response::failure("Unknown action"),
            Err(e) => Response::failure(e.to_string()),
        }
    }

    /// Scroll the host page until it stops growing
    pub async fn auto_scroll<S: ScrollSurface>(
        &self,
        surface: &mut S,
        options: &ScrollOptions,
    ) -> Result<ScrollReport, ScanError> {
        let config = options.apply(&self.config.scroll);
        config.validate()?;
        let report = scroll::auto_scroll(surface, &config).await;
        info!(
            steps = report.steps_taken,
            height = report.final_height,
            "auto-scroll finished"
        );
        Ok(report)
    }

    /// Like [`handle`](Self::handle), with the host's scroll surface
    /// available to `autoScroll`
    pub async fn handle_with_surface<S: ScrollSurface>(
        &mut self,
        page: &Page,
        surface: &mut S,
        request: Request,
    ) -> Response {
        match request {
            Request::AutoScroll { options } => self
                .auto_scroll(surface, &options)
                .await
                .map(|result| Payload::Scroll { result })
                .into(),
            other => self.handle(page, other),
        }
    }

    pub async fn handle_json_with_surface<S: ScrollSurface>(
        &mut self,
        page: &Page,
        surface: &mut S,
        request_json: &str,
    ) -> Response {
        match Request::from_json(request_json) {
            Ok(Some(request)) => self.handle_with_surface(page, surface, request).await,
            Ok(None) => Response::failure("Unknown action"),
            Err(e) => Response::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const PAGE: &str = r#"
    <html><body>
        <h1>Team</h1>
        <table>
            <thead><tr><th>Name</th><th>Age</th></tr></thead>
            <tbody>
                <tr><td>Ann</td><td>30</td></tr>
                <tr><td></td><td></td></tr>
                <tr><td>Bo, Jr.</td><td>41</td></tr>
            </tbody>
        </table>
        <ul><li>A</li><li>B</li></ul>
        <a href="/team?page=2">Next</a>
    </body></html>
    "#;

    fn to_json(response: &Response) -> Value {
        serde_json::to_value(response).unwrap()
    }

    fn scan_ids(scanner: &mut PageScanner, page: &Page) -> Vec<String> {
        let response = to_json(&scanner.handle(page, Request::ScanPage));
        assert_eq!(response["success"], true);
        response["datasets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_scan_then_fetch() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE);
        let response = to_json(&scanner.handle(&page, Request::ScanPage));

        assert_eq!(response["success"], true);
        assert_eq!(response["scan"], 1);
        let datasets = response["datasets"].as_array().unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0]["type"], "table");
        assert_eq!(datasets[0]["headers"], json!(["Name", "Age"]));
        assert_eq!(datasets[0]["rows"].as_array().unwrap().len(), 2);
        assert_eq!(datasets[1]["rows"], json!([{"Item": "A"}, {"Item": "B"}]));

        let id = datasets[0]["id"].as_str().unwrap();
        let fetched = to_json(&scanner.handle_json(
            &page,
            &json!({"action": "getDataset", "id": id}).to_string(),
        ));
        assert_eq!(fetched["success"], true);
        assert_eq!(fetched["dataset"]["rows"][1]["Name"], "Bo, Jr.");
    }

    #[test]
    fn test_unknown_id_fails_with_rescan_message() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE);
        let response = to_json(&scanner.handle_json(
            &page,
            r#"{"action": "getDataset", "id": "table-never-0-0"}"#,
        ));
        assert_eq!(response["success"], false);
        let error = response["error"].as_str().unwrap();
        assert!(error.contains("not found"));
        assert!(error.contains("Rescan"));
    }

    #[test]
    fn test_rescan_invalidates_previous_ids() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE);
        let first = scan_ids(&mut scanner, &page);
        scan_ids(&mut scanner, &page);

        let id = DatasetId::from(first[0].as_str());
        assert!(scanner.dataset(&id, None).is_err());
        assert!(matches!(
            scanner.export(&id, ExportFormat::Csv, Some(ScanToken(1))),
            Err(ScanError::StaleScan { .. })
        ));
    }

    #[test]
    fn test_update_headers_then_export() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE);
        let ids = scan_ids(&mut scanner, &page);

        let update = to_json(&scanner.handle_json(
            &page,
            &json!({"action": "updateHeaders", "id": ids[0], "headers": [" Person ", ""], "scan": 1})
                .to_string(),
        ));
        assert_eq!(update["success"], true);
        assert_eq!(update["dataset"]["headers"], json!(["Person", "Age"]));
        assert_eq!(update["dataset"]["previewRows"][0], json!({"Person": "Ann", "Age": "30"}));

        let csv = to_json(&scanner.handle_json(
            &page,
            &json!({"action": "copyDataset", "id": ids[0]}).to_string(),
        ));
        assert_eq!(csv["format"], "csv");
        assert_eq!(csv["content"], "Person,Age\nAnn,30\n\"Bo, Jr.\",41");

        let structured = to_json(&scanner.handle_json(
            &page,
            &json!({"action": "copyDataset", "id": ids[1], "format": "json"}).to_string(),
        ));
        let rows: Value = serde_json::from_str(structured["content"].as_str().unwrap()).unwrap();
        assert_eq!(rows, json!([{"Item": "A"}, {"Item": "B"}]));
    }

    #[test]
    fn test_context_snapshot_and_next() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE).with_url(Url::parse("https://example.org/team").unwrap());

        let snapshot = to_json(&scanner.handle_json(
            &page,
            r#"{"action": "getContextSnapshot", "options": {"maxLength": 4}}"#,
        ));
        assert_eq!(snapshot["context"], "Team");

        let next = to_json(&scanner.handle(&page, Request::ClickNext));
        assert_eq!(next["success"], true);
        assert_eq!(next["action"]["kind"], "navigate");
        assert_eq!(next["action"]["href"], "https://example.org/team?page=2");
    }

    #[test]
    fn test_export_format_names() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE);
        let ids = scan_ids(&mut scanner, &page);
        let copy = |scanner: &mut PageScanner, format: &str| {
            to_json(&scanner.handle_json(
                &page,
                &json!({"action": "copyDataset", "id": ids[0], "format": format}).to_string(),
            ))
        };

        let delimited = copy(&mut scanner, "delimited");
        assert_eq!(delimited["success"], true);
        assert_eq!(delimited["format"], "csv");
        assert!(delimited["content"].as_str().unwrap().starts_with("Name,Age\n"));

        let structured = copy(&mut scanner, "structured");
        assert_eq!(structured["success"], true);
        assert_eq!(structured["format"], "json");

        let xml = copy(&mut scanner, "xml");
        assert_eq!(xml["success"], false);
        assert_eq!(xml["error"], "Unknown export format: xml");
    }

    /// Page that grows by 500px on each of its first `loads` scrolls
    struct GrowingPage {
        height: f64,
        loads: u32,
    }

    impl ScrollSurface for GrowingPage {
        fn viewport_height(&self) -> f64 {
            600.0
        }

        fn scroll_height(&self) -> f64 {
            self.height
        }

        fn scroll_by(&mut self, _delta: f64) {
            if self.loads > 0 {
                self.loads -= 1;
                self.height += 500.0;
            }
        }

        fn scroll_to_bottom(&mut self) {}
    }

    #[tokio::test]
    async fn test_auto_scroll_request() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE);
        let mut surface = GrowingPage { height: 1000.0, loads: 2 };

        let response = to_json(
            &scanner
                .handle_json_with_surface(
                    &page,
                    &mut surface,
                    r#"{"action": "autoScroll", "options": {"step": 400, "maxSteps": 10, "idleThreshold": 2, "wait": 1}}"#,
                )
                .await,
        );
        assert_eq!(response["success"], true);
        // two growing steps, then two idle ones
        assert_eq!(response["result"]["stepsTaken"], 4);
        assert_eq!(response["result"]["finalHeight"], 2000.0);

        let invalid = to_json(
            &scanner
                .handle_json_with_surface(
                    &page,
                    &mut surface,
                    r#"{"action": "autoScroll", "options": {"idleThreshold": 0}}"#,
                )
                .await,
        );
        assert_eq!(invalid["success"], false);

        let scanned = to_json(
            &scanner
                .handle_json_with_surface(&page, &mut surface, r#"{"action": "scanPage"}"#)
                .await,
        );
        assert_eq!(scanned["datasets"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_auto_scroll_without_surface() {
        let mut scanner = PageScanner::default();
        let page = Page::new(PAGE);
        let response = to_json(&scanner.handle_json(&page, r#"{"action": "autoScroll"}"#));
        assert_eq!(response["success"], false);
        assert_eq!(response["error"], "Auto-scroll needs a scrollable page.");
    }

    #[test]
    fn test_unknown_and_malformed_requests() {
        let mut scanner = PageScanner::default();
        let page = Page::new("<html><body></body></html>");

        let unknown = to_json(&scanner.handle_json(&page, r#"{"action": "dance"}"#));
        assert_eq!(unknown["success"], false);
        assert_eq!(unknown["error"], "Unknown action");

        let malformed = to_json(&scanner.handle_json(&page, "{not json"));
        assert_eq!(malformed["success"], false);

        let no_next = to_json(&scanner.handle(&page, Request::ClickNext));
        assert_eq!(no_next["error"], "No next or load more button found.");

        let empty = to_json(&scanner.handle(&page, Request::ScanPage));
        assert_eq!(empty["datasets"], json!([]));
    }
}
