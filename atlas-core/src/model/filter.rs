//! ``src/model/filter.rs``
//! ============================================================================
//! # Country filter
//!
//! Pure search/region filter over the loaded collection. Same inputs, same
//! output, original order preserved.

use crate::model::country::{Country, Region};

/// Trim and lowercase raw search input.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Countries whose common name contains `query` (case-insensitive) and whose
/// region passes the `region` gate.
pub fn filter<'a>(collection: &'a [Country], query: &str, region: Region) -> Vec<&'a Country> {
    let needle = normalize_query(query);

    collection
        .iter()
        .filter(|country| region.matches(&country.region))
        .filter(|country| needle.is_empty() || country.name.common.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::country::fixtures::country;

    fn sample() -> Vec<Country> {
        vec![
            country("FRA", "France", "Europe"),
            country("DEU", "Germany", "Europe"),
            country("JPN", "Japan", "Asia"),
            country("KEN", "Kenya", "Africa"),
            country("FJI", "Fiji", "Oceania"),
        ]
    }

    fn codes(found: &[&Country]) -> Vec<String> {
        found.iter().map(|c| c.code.to_string()).collect()
    }

    #[test]
    fn test_identity_filter_returns_collection() {
        let all = sample();
        let found = filter(&all, "", Region::All);
        assert_eq!(found.len(), all.len());
        assert!(found.iter().zip(all.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let all = vec![country("FRA", "France", "Europe")];
        assert_eq!(codes(&filter(&all, "FRA", Region::All)), ["FRA"]);
        assert_eq!(codes(&filter(&all, "  anc ", Region::All)), ["FRA"]);
    }

    #[test]
    fn test_region_gate_excludes_other_regions() {
        let all = vec![country("FRA", "France", "Europe")];
        assert!(filter(&all, "", Region::Asia).is_empty());
    }

    #[test]
    fn test_query_and_region_combine() {
        let all = sample();
        assert_eq!(codes(&filter(&all, "an", Region::Europe)), ["FRA", "DEU"]);
        assert_eq!(codes(&filter(&all, "an", Region::All)), ["FRA", "DEU", "JPN"]);
        assert!(filter(&all, "zzz", Region::Africa).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let all = sample();
        for (query, region) in [("", Region::All), ("a", Region::Europe), ("j", Region::Asia)] {
            let once: Vec<Country> = filter(&all, query, region).into_iter().cloned().collect();
            let twice: Vec<Country> = filter(&once, query, region).into_iter().cloned().collect();
            assert_eq!(once, twice);
        }
    }
}
