//! Dataset identity generation
//!
//! Identities are derived from the closest ancestors of the matched root,
//! then salted with a timestamp and a random suffix. They are only
//! meaningful within the scan that produced them.

use rand::Rng;
use scraper::ElementRef;

use crate::dataset::DatasetId;
use crate::text::normalize_text;

/// Ancestor tokens kept in an identity
const MAX_PATH_TOKENS: usize = 3;

/// Selector-like token for one element: `tag#id` or `tag.class.list`
fn selector_token(element: ElementRef<'_>) -> String {
    let el = element.value();
    let mut token = el.name().to_ascii_lowercase();
    match el.id().filter(|id| !id.is_empty()) {
        Some(id) => {
            token.push('#');
            token.push_str(id);
        }
        None => {
            let classes = normalize_text(el.attr("class").unwrap_or_default()).replace(' ', ".");
            if !classes.is_empty() {
                token.push('.');
                token.push_str(&classes);
            }
        }
    }
    token
}

/// Structural path of the element below `<body>`, closest three levels,
/// joined with `>`. Empty when the element is `<body>` itself.
pub fn structural_path(element: ElementRef<'_>) -> String {
    let mut path = Vec::new();
    let mut current = Some(element);
    while let Some(el) = current {
        if el.value().name() == "body" {
            break;
        }
        path.push(selector_token(el));
        current = el.parent().and_then(ElementRef::wrap);
    }
    path.reverse();

    let start = path.len().saturating_sub(MAX_PATH_TOKENS);
    path[start..].join(">")
}

fn random_salt() -> u32 {
    rand::thread_rng().gen_range(0..10_000)
}

/// Derive a dataset identity: `{prefix}-{path}-{millis}-{random}`
pub fn dataset_id(element: ElementRef<'_>, prefix: &str) -> DatasetId {
    let path = structural_path(element);
    let base = if path.is_empty() { prefix } else { path.as_str() };
    let millis = chrono::Utc::now().timestamp_millis();
    DatasetId::from(format!("{}-{}-{}-{}", prefix, base, millis, random_salt()))
}

/// The same identity with a fresh random suffix
pub fn resalt(id: &DatasetId) -> DatasetId {
    let base = id.as_str().rsplit_once('-').map_or(id.as_str(), |(base, _)| base);
    DatasetId::from(format!("{}-{}", base, random_salt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, sel: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(sel).unwrap()).next().unwrap()
    }

    #[test]
    fn test_path_keeps_closest_three_levels() {
        let doc = Html::parse_document(
            r#"<body><main><section class="results  wide"><div id="wrap"><table></table></div></section></main></body>"#,
        );
        let table = first(&doc, "table");
        assert_eq!(structural_path(table), "section.results.wide>div#wrap>table");
    }

    #[test]
    fn test_id_takes_precedence_over_class() {
        let doc = Html::parse_document(r#"<body><ul id="menu" class="nav"></ul></body>"#);
        assert_eq!(structural_path(first(&doc, "ul")), "ul#menu");
    }

    #[test]
    fn test_body_falls_back_to_prefix() {
        let doc = Html::parse_document("<body><p>x</p></body>");
        let body = first(&doc, "body");
        assert_eq!(structural_path(body), "");
        let id = dataset_id(body, "cards");
        assert!(id.as_str().starts_with("cards-cards-"));
    }

    #[test]
    fn test_id_shape() {
        let doc = Html::parse_document("<body><table></table></body>");
        let id = dataset_id(first(&doc, "table"), "table");
        let parts: Vec<&str> = id.as_str().rsplitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<u32>().unwrap() < 10_000);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2], "table-table");
    }

    #[test]
    fn test_resalt_keeps_everything_but_the_suffix() {
        let id = DatasetId::from("list-main>ul-1700000000000-42");
        let salted = resalt(&id);
        let (base, salt) = salted.as_str().rsplit_once('-').unwrap();
        assert_eq!(base, "list-main>ul-1700000000000");
        assert!(salt.parse::<u32>().unwrap() < 10_000);
    }
}
