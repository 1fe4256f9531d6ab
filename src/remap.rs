//! Header remapping
//!
//! Renames a dataset's columns and re-keys every row to match. Row order,
//! row count and values are untouched.

use crate::dataset::{column_placeholder, Dataset, Row};

/// Resolve candidate headers against the current ones.
///
/// Candidates are trimmed; a blank or missing candidate keeps the current
/// header, or a positional placeholder when that is blank too. Candidates
/// past the current header count are ignored.
pub fn resolve_headers(current: &[String], candidates: &[String]) -> Vec<String> {
    current
        .iter()
        .enumerate()
        .map(|(i, existing)| {
            candidates
                .get(i)
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(String::from)
                .or_else(|| Some(existing.clone()).filter(|e| !e.is_empty()))
                .unwrap_or_else(|| column_placeholder(i))
        })
        .collect()
}

/// Rename the dataset's headers in place and re-key every row
pub fn remap_headers<'a>(dataset: &'a mut Dataset, candidates: &[String]) -> &'a Dataset {
    let next = resolve_headers(&dataset.headers, candidates);

    for row in &mut dataset.rows {
        let mut rekeyed = Row::new();
        for (old, new) in dataset.headers.iter().zip(&next) {
            if let Some(value) = row.get(old) {
                rekeyed.insert(new.clone(), value);
            }
        }
        *row = rekeyed;
    }
    dataset.headers = next;
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetId, DatasetKind};
    use proptest::prelude::*;

    fn sample() -> Dataset {
        Dataset {
            id: DatasetId::from("table-t-1-1"),
            kind: DatasetKind::Table,
            label: "t".into(),
            headers: vec!["Name".into(), "Age".into(), "".into()],
            rows: vec![
                [("Name", "Ann"), ("Age", "30"), ("", "x")].into_iter().collect::<Row>(),
                [("Name", "Bo")].into_iter().collect::<Row>(),
            ],
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rename_with_fallbacks() {
        let mut dataset = sample();
        remap_headers(&mut dataset, &strings(&["  Person ", ""]));

        assert_eq!(dataset.headers, vec!["Person", "Age", "Column 3"]);
        assert_eq!(dataset.rows[0].get("Person"), Some("Ann"));
        assert_eq!(dataset.rows[0].get("Column 3"), Some("x"));
        assert_eq!(dataset.rows[0].get("Name"), None);
        // sparse rows stay sparse
        assert_eq!(dataset.rows[1].keys().collect::<Vec<_>>(), vec!["Person"]);
    }

    #[test]
    fn test_extra_candidates_are_ignored() {
        let mut dataset = sample();
        remap_headers(&mut dataset, &strings(&["A", "B", "C", "D", "E"]));
        assert_eq!(dataset.headers, vec!["A", "B", "C"]);
        assert_eq!(dataset.rows.len(), 2);
    }

    #[test]
    fn test_same_headers_leave_rows_unchanged() {
        let mut dataset = sample();
        dataset.headers[2] = "Extra".into();
        dataset.rows[0] = [("Name", "Ann"), ("Age", "30"), ("Extra", "x")].into_iter().collect();
        let before = dataset.rows.clone();
        let headers = dataset.headers.clone();

        remap_headers(&mut dataset, &headers);
        assert_eq!(dataset.rows, before);
        assert_eq!(dataset.headers, headers);
    }

    proptest! {
        #[test]
        fn remap_preserves_row_count_and_values(
            values in prop::collection::vec(prop::collection::vec("[a-z0-9 ]{0,6}", 3), 0..20),
            names in prop::collection::vec("[A-Za-z]{1,8}", 0..5),
        ) {
            let headers = strings(&["H1", "H2", "H3"]);
            let rows: Vec<Row> = values
                .iter()
                .map(|vals| headers.iter().cloned().zip(vals.iter().cloned()).collect::<Row>())
                .collect();
            let mut dataset = Dataset {
                id: DatasetId::from("grid-x-1-1"),
                kind: DatasetKind::Grid,
                label: "g".into(),
                headers: headers.clone(),
                rows,
            };

            // distinct names so no two columns collapse onto one key
            let candidates: Vec<String> = names
                .iter()
                .enumerate()
                .map(|(i, n)| format!("{}{}", n, i))
                .collect();
            remap_headers(&mut dataset, &candidates);

            prop_assert_eq!(dataset.rows.len(), values.len());
            for (row, vals) in dataset.rows.iter().zip(&values) {
                let mut got: Vec<&str> = row.values().collect();
                let mut want: Vec<&str> = vals.iter().map(String::as_str).collect();
                got.sort();
                want.sort();
                prop_assert_eq!(got, want);
                for (i, header) in dataset.headers.iter().enumerate() {
                    prop_assert_eq!(row.get(header), Some(vals[i].as_str()));
                }
            }
        }
    }
}
