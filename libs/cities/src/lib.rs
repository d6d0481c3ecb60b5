//! City extraction and autocomplete ranking.
//!
//! Event locations in the platform are stored three ways: a free-text field on
//! the event ("Kulturbrauerei, Berlin, DE"), a free-text field on individual
//! occurrences, and a structured location row with a proper `city` column.
//! Autocomplete has to draw candidates from all of them, which means turning
//! free-text addresses into city tokens and ranking a mixed candidate pool
//! against a partial query.

#![forbid(unsafe_code)]

/// Extract a best-effort city token from a free-text address.
///
/// The heuristic is a plain comma split: with at least two comma-separated
/// segments the city is the second segment, otherwise the whole trimmed string
/// is treated as the city. Addresses are user-entered and follow no schema, so
/// this deliberately stays a dumb split; callers that need precision should use
/// the structured location instead.
///
/// Returns `None` when the extracted token is empty.
pub fn extract_city(address: &str) -> Option<String> {
    let segments: Vec<&str> = address.split(',').collect();
    let city = if segments.len() >= 2 {
        segments[1].trim()
    } else {
        address.trim()
    };

    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

/// Rank city candidates against a partial query and truncate to `limit`.
///
/// Candidates that do not contain the query (case-insensitive) are dropped:
/// extraction can surface a city token that no longer contains the text the
/// user typed (the query may have matched the venue part of the address).
/// Candidates whose lowercase form starts with the lowercase query sort before
/// candidates that merely contain it; within each group ordering is
/// lexicographic on the lowercase form (original string as tiebreaker, so the
/// order is total). Deduplication is the caller's concern.
pub fn rank_cities(candidates: Vec<String>, query: &str, limit: usize) -> Vec<String> {
    let query_lower = query.to_lowercase();

    let mut matches: Vec<String> = candidates
        .into_iter()
        .filter(|city| city.to_lowercase().contains(&query_lower))
        .collect();

    matches.sort_by_cached_key(|city| {
        let lower = city.to_lowercase();
        let group = if lower.starts_with(&query_lower) { 0u8 } else { 1 };
        (group, lower, city.clone())
    });

    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_second_comma_segment_as_city() {
        assert_eq!(
            extract_city("123 Main St, Berlin, DE"),
            Some("Berlin".to_string())
        );
        assert_eq!(
            extract_city("Olympiapark, München, Deutschland"),
            Some("München".to_string())
        );
    }

    #[test]
    fn falls_back_to_whole_string_without_commas() {
        assert_eq!(extract_city("Munich"), Some("Munich".to_string()));
        assert_eq!(extract_city("  Hamburg  "), Some("Hamburg".to_string()));
    }

    #[test]
    fn empty_segments_yield_none() {
        assert_eq!(extract_city(""), None);
        assert_eq!(extract_city("   "), None);
        // Second segment present but blank.
        assert_eq!(extract_city("Somewhere, , DE"), None);
    }

    #[test]
    fn prefix_matches_rank_before_containment_matches() {
        let candidates = vec![
            "Hamburg".to_string(),
            "Berlingen".to_string(),
            "Oberlin".to_string(),
            "Berlin".to_string(),
        ];
        let ranked = rank_cities(candidates, "berl", 10);
        // Hamburg does not contain the query at all and is dropped.
        assert_eq!(ranked, vec!["Berlin", "Berlingen", "Oberlin"]);
    }

    #[test]
    fn query_with_no_matches_yields_empty() {
        let candidates = vec!["Berlin".to_string(), "Hamburg".to_string()];
        assert!(rank_cities(candidates, "xz", 10).is_empty());
    }

    #[test]
    fn ranking_is_case_insensitive() {
        let candidates = vec!["berlin".to_string(), "Bergen".to_string()];
        let ranked = rank_cities(candidates, "BER", 10);
        assert_eq!(ranked, vec!["Bergen", "berlin"]);
    }

    #[test]
    fn truncates_to_limit() {
        let candidates = vec![
            "Aachen".to_string(),
            "Augsburg".to_string(),
            "Aurich".to_string(),
        ];
        let ranked = rank_cities(candidates, "au", 2);
        assert_eq!(ranked, vec!["Augsburg", "Aurich"]);
    }
}
