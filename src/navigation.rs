//! "Next page" / "load more" control detection

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::detectors::selector;
use crate::text::{normalize_opt, rendered_text};
use crate::visibility::is_visible;

/// Clickable element kinds, searched in this order
static CLICKABLES: LazyLock<[Selector; 4]> = LazyLock::new(|| {
    [
        selector("a"),
        selector("button"),
        selector(r#"[role="button"]"#),
        selector(r#"[role="link"]"#),
    ]
});
static REL_NEXT: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[rel="next"], link[rel="next"]"#));
static NEXT_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)next|more|older|load more|show more|>|»|→").unwrap());

/// Elements that honour the `disabled` attribute
const FORM_CONTROLS: &[&str] = &["button", "input", "select", "textarea"];

/// A control that likely advances pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextControl {
    /// Lowercase tag name
    pub tag: String,
    /// The text that matched, or the fallback link's href
    pub text: String,
    /// Resolved target for anchors and `rel="next"` links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// What the host should do to advance the page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NextAction {
    /// Follow the anchor's URL
    Navigate { href: String },
    /// Dispatch a click on the control
    Click { control: NextControl },
}

/// Outcome of a "click next" request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextStep {
    pub action: NextAction,
    pub message: String,
}

/// Label a control by rendered text, `aria-label`, then `title`
fn control_text(element: ElementRef<'_>) -> String {
    let text = rendered_text(element);
    if !text.is_empty() {
        return text;
    }
    let aria = normalize_opt(element.value().attr("aria-label"));
    if !aria.is_empty() {
        return aria;
    }
    normalize_opt(element.value().attr("title"))
}

fn is_disabled(element: ElementRef<'_>) -> bool {
    FORM_CONTROLS.contains(&element.value().name()) && element.value().attr("disabled").is_some()
}

fn resolve_href(raw: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => base.join(raw).map(String::from).unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}

/// Visible, enabled controls whose label reads like "next" or "more",
/// falling back to `rel="next"` links
pub fn find_next_controls(document: &Html, base: Option<&Url>) -> Vec<NextControl> {
    let mut seen = HashSet::new();
    let mut controls = Vec::new();

    for sel in CLICKABLES.iter() {
        for element in document.select(sel) {
            if !seen.insert(element.id()) {
                continue;
            }
            let text = control_text(element);
            if text.is_empty() || !NEXT_KEYWORDS.is_match(&text) {
                continue;
            }
            if !is_visible(element) || is_disabled(element) {
                continue;
            }
            let href = (element.value().name() == "a")
                .then(|| element.value().attr("href"))
                .flatten()
                .map(|h| resolve_href(h, base));
            controls.push(NextControl {
                tag: element.value().name().to_string(),
                text,
                href,
            });
        }
    }

    if controls.is_empty() {
        for element in document.select(&REL_NEXT) {
            let href = element.value().attr("href").map(|h| resolve_href(h, base));
            controls.push(NextControl {
                // a <link> only carries a URL, so it is followed like an anchor
                tag: "a".to_string(),
                text: href.clone().unwrap_or_default(),
                href,
            });
        }
    }

    controls
}

/// Pick the first candidate and decide how to trigger it
pub fn plan_next_step(document: &Html, base: Option<&Url>) -> Option<NextStep> {
    let target = find_next_controls(document, base).into_iter().next()?;

    match target.href.as_deref() {
        Some(href) if target.tag == "a" && !href.is_empty() && !href.ends_with('#') => {
            Some(NextStep {
                action: NextAction::Navigate {
                    href: href.to_string(),
                },
                message: "Triggered anchor navigation.".to_string(),
            })
        }
        _ => Some(NextStep {
            action: NextAction::Click { control: target },
            message: "Clicked next/load more button.".to_string(),
        }),
    }
}
