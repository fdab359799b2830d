use crate::records::UrlRecord;
use std::collections::HashSet;

/// Restricts the valid set to URLs still referenced by at least one input
/// record. A cross-check against tampering or removal: the pipeline never
/// invents URLs that are absent from the original record list.
pub fn ensure_unique_urls(valid_urls: &HashSet<String>, records: &[UrlRecord]) -> HashSet<String> {
    records
        .iter()
        .filter(|record| valid_urls.contains(&record.url))
        .map(|record| record.url.clone())
        .collect()
}

/// Walks the records in original order and emits the first record for each
/// URL in the survivor set, skipping later duplicates of the same URL.
///
/// First-occurrence-wins and original-order preservation are required
/// properties of the output, not implementation details.
pub fn filter_records(valid_urls: &HashSet<String>, records: &[UrlRecord]) -> Vec<UrlRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| valid_urls.contains(&record.url) && seen.insert(record.url.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(raw: &[(u32, &str)]) -> Vec<UrlRecord> {
        raw.iter()
            .map(|(id, url)| UrlRecord::new(*id, "2025-05-01", *url))
            .collect()
    }

    fn url_set(raw: &[&str]) -> HashSet<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let all = records(&[
            (1, "http://example.com/a"),
            (2, "http://example.com/b"),
            (3, "http://example.com/a"),
            (4, "http://example.com/c"),
        ]);
        let valid = url_set(&["http://example.com/a", "http://example.com/c"]);

        let filtered = filter_records(&valid, &all);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, 1);
        assert_eq!(filtered[1].id, 4);
    }

    #[test]
    fn test_never_invents_urls() {
        let all = records(&[(1, "http://example.com/a")]);
        let valid = url_set(&["http://example.com/a", "http://example.com/elsewhere"]);

        let restricted = ensure_unique_urls(&valid, &all);

        assert_eq!(restricted, url_set(&["http://example.com/a"]));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let all = records(&[
            (1, "http://example.com/a"),
            (2, "http://example.com/a"),
            (3, "http://example.com/b"),
        ]);
        let valid = url_set(&["http://example.com/a", "http://example.com/b"]);

        let once = filter_records(&valid, &all);
        let twice = filter_records(&valid, &once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_order_preserved() {
        let all = records(&[
            (1, "http://example.com/c"),
            (2, "http://example.com/a"),
            (3, "http://example.com/b"),
        ]);
        let valid = url_set(&[
            "http://example.com/a",
            "http://example.com/b",
            "http://example.com/c",
        ]);

        let filtered = filter_records(&valid, &all);

        let ids: Vec<u32> = filtered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_survivor_set() {
        let all = records(&[(1, "http://example.com/a")]);
        let valid = HashSet::new();

        assert!(filter_records(&valid, &all).is_empty());
        assert!(ensure_unique_urls(&valid, &all).is_empty());
    }
}
