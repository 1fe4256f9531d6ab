//! Text normalization and element text rendering

use scraper::{ElementRef, Node};

use crate::visibility;

/// Elements whose content never renders as text
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line when rendered
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Collapse every whitespace run to a single space and trim the ends
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize optional text; `None` becomes the empty string
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}

/// Normalized concatenation of every descendant text node
pub fn text_content(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Normalized text as a reader would see it: block boundaries separate
/// words, hidden subtrees and script/style bodies are left out.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_rendered(element, &mut out);
    normalize_text(&out)
}

fn collect_rendered(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) || visibility::is_removed_from_layout(child_el) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_rendered(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Truncate to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, sel: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(sel).unwrap()).next().unwrap()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \n\t b  "), "a b");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("\u{a0}x\u{a0}"), "x");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" y ")), "y");
    }

    #[test]
    fn test_rendered_text_separates_blocks() {
        let doc = Html::parse_document(
            r#"<div id="card"><p>Alpha</p><p>Beta</p><span>Gam</span><span>ma</span></div>"#,
        );
        let card = first(&doc, "#card");
        assert_eq!(rendered_text(card), "Alpha Beta Gamma");
        assert_eq!(text_content(card), "AlphaBetaGamma");
    }

    #[test]
    fn test_rendered_text_skips_hidden_and_scripts() {
        let doc = Html::parse_document(
            r#"<div id="card">Shown<script>var x = 1;</script>
               <span hidden>secret</span><em style="display: none">gone</em>
               <br>Tail</div>"#,
        );
        assert_eq!(rendered_text(first(&doc, "#card")), "Shown Tail");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
