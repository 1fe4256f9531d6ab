//! Static visibility checks
//!
//! There is no layout engine here, so visibility is judged from what the
//! markup itself says: the `hidden` attribute, inline `display`,
//! `visibility` and `opacity` declarations, and placement under
//! non-rendered containers.

use scraper::ElementRef;

/// Containers whose descendants never render
const NON_RENDERED: &[&str] = &["head", "template", "script", "style", "noscript"];

/// Value of the last inline declaration of `property`, lowercased
pub fn inline_style(element: ElementRef<'_>, property: &str) -> Option<String> {
    let style = element.value().attr("style")?;
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| {
            let value = value.trim().to_ascii_lowercase();
            value.trim_end_matches("!important").trim_end().to_string()
        })
        .last()
}

/// True when the element generates no box at all (`hidden` or `display: none`)
pub fn is_removed_from_layout(element: ElementRef<'_>) -> bool {
    element.value().attr("hidden").is_some()
        || inline_style(element, "display").as_deref() == Some("none")
}

/// Whether the element is meaningfully visible
pub fn is_visible(element: ElementRef<'_>) -> bool {
    let chain = std::iter::once(element).chain(element.ancestors().filter_map(ElementRef::wrap));

    let mut visibility_decided = false;
    for el in chain {
        if NON_RENDERED.contains(&el.value().name()) || is_removed_from_layout(el) {
            return false;
        }
        // nearest declaration wins, a child may override a hidden parent
        if !visibility_decided {
            if let Some(value) = inline_style(el, "visibility") {
                if value == "hidden" || value == "collapse" {
                    return false;
                }
                visibility_decided = true;
            }
        }
    }

    !matches!(
        inline_style(element, "opacity").and_then(|v| v.parse::<f64>().ok()),
        Some(o) if o == 0.0
    )
}
