//! Fuzzy title matching against the catalog.
//!
//! Similarity is the Ratcliff/Obershelp ratio: `2 * M / T`, where `M` is the
//! total length of the longest matching blocks found recursively and `T` the
//! combined length of both strings.

use difflib::sequencematcher::SequenceMatcher;
use log::debug;

use crate::error::MatchError;
use crate::models::{Catalog, Track};
use crate::normalize::{clean_query, match_key};

/// Minimum similarity for a name to count as a match.
pub const MATCH_CUTOFF: f64 = 0.35;

// ============================================================================
// Similarity
// ============================================================================

/// Total size of the matching blocks between `a` and `b`.
/// `b` is the indexed side, so long queries get the popular-character rule.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    SequenceMatcher::new(a, b)
        .get_matching_blocks()
        .iter()
        .map(|m| m.size)
        .sum()
}

fn ratio_of(matches: usize, a_len: usize, b_len: usize) -> f64 {
    let total = a_len + b_len;
    if total == 0 {
        1.0
    } else {
        2.0 * matches as f64 / total as f64
    }
}

/// Ratio of two match keys. Kept in f64 so the cutoff compares exactly.
fn key_ratio(a: &[char], b: &[char]) -> f64 {
    ratio_of(matched_chars(a, b), a.len(), b.len())
}

/// Upper bound on the ratio from lengths alone.
fn length_bound(a_len: usize, b_len: usize) -> f64 {
    ratio_of(a_len.min(b_len), a_len, b_len)
}

/// Similarity of `a` and `b` in [0, 1], compared in NFC form.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    key_ratio(&match_key(a), &match_key(b))
}

// ============================================================================
// Catalog Matching
// ============================================================================

/// Index and similarity of the best catalog name at or above the cutoff.
/// Ties keep the earliest catalog row.
pub fn find_match_index(query: &str, catalog: &Catalog) -> Option<(usize, f64)> {
    if query.is_empty() {
        return None;
    }

    let query_key = match_key(query);
    let mut best: Option<(usize, f64)> = None;

    for (idx, key) in catalog.name_keys().iter().enumerate() {
        if length_bound(key.len(), query_key.len()) < MATCH_CUTOFF {
            continue;
        }
        let score = key_ratio(key, &query_key);
        if score < MATCH_CUTOFF {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }

    best
}

/// Best matching track for a free-text query, or `None`.
///
/// Names are not unique: when several rows share the winning name, the
/// first row in catalog order is returned.
pub fn find_match<'a>(query: &str, catalog: &'a Catalog) -> Option<&'a Track> {
    let (idx, score) = find_match_index(query, catalog)?;
    let track = catalog.get(idx)?;
    debug!(
        "Matched {:?} -> {:?} by {:?} (similarity {:.3})",
        query, track.name, track.artist, score
    );
    Some(track)
}

/// Clean the query and match it, reporting why nothing was found.
pub fn match_query<'a>(query: &str, catalog: &'a Catalog) -> Result<&'a Track, MatchError> {
    let cleaned = clean_query(query);
    if cleaned.is_empty() {
        return Err(MatchError::EmptyInput);
    }
    find_match(&cleaned, catalog).ok_or(MatchError::NoMatchFound(cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FEATURE_COUNT;
    use crate::normalize::MinMaxScaler;

    fn catalog(names: &[&str]) -> Catalog {
        let tracks: Vec<Track> = names
            .iter()
            .enumerate()
            .map(|(i, n)| Track {
                name: n.to_string(),
                artist: format!("artist {}", i),
                genre: "pop".to_string(),
                features: [0.0; FEATURE_COUNT],
            })
            .collect();
        let scaler = MinMaxScaler::fit(tracks.iter().map(|t| &t.features));
        Catalog::new(tracks, scaler)
    }

    #[test]
    fn test_ratio_known_values() {
        assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
        assert_eq!(similarity_ratio("apple", "appel"), 0.8);
        assert_eq!(similarity_ratio("ape", "appel"), 0.75);
        assert_eq!(similarity_ratio("same", "same"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_ratio_empty_strings() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_is_case_sensitive() {
        assert!(similarity_ratio("Hello", "hello") < 1.0);
    }

    #[test]
    fn test_length_bound_is_upper_bound() {
        for (a, b) in [("Blinding", "Blinding Lights"), ("Bad Guy", "Blinding Lights")] {
            let bound = length_bound(match_key(a).len(), match_key(b).len());
            assert!(bound >= similarity_ratio(a, b));
        }
        assert_eq!(length_bound(1, 9), 0.2);
    }

    #[test]
    fn test_long_query_with_popular_chars() {
        let long_name = format!("{}xyz", "a".repeat(250));
        assert!(similarity_ratio(&long_name, &long_name) > 0.99);

        let c = catalog(&["Short", long_name.as_str(), "aaaa"]);
        let (idx, _) = find_match_index(&long_name, &c).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_empty_query_has_no_match() {
        let c = catalog(&["", "Song"]);
        assert!(find_match("", &c).is_none());
    }

    #[test]
    fn test_exact_name_returns_that_track() {
        let c = catalog(&["Bad Guy", "Blinding Lights", "Levitating"]);
        let track = find_match("Blinding Lights", &c).unwrap();
        assert_eq!(track.name, "Blinding Lights");
        assert_eq!(track.artist, "artist 1");
    }

    #[test]
    fn test_best_scoring_name_wins() {
        let c = catalog(&["ape", "apple", "peach", "puppy"]);
        assert_eq!(find_match("appel", &c).unwrap().name, "apple");
    }

    #[test]
    fn test_below_cutoff_is_no_match() {
        let c = catalog(&["Bad Guy", "Levitating"]);
        assert!(find_match("zzzzzzzz", &c).is_none());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let c = catalog(&["abx", "aby"]);
        let (idx, score) = find_match_index("ab", &c).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(score, 0.8);
    }

    #[test]
    fn test_duplicate_names_return_first_row() {
        let c = catalog(&["Other", "Hello", "Hello"]);
        let track = find_match("Hello", &c).unwrap();
        assert_eq!(track.artist, "artist 1");
    }

    #[test]
    fn test_match_query_errors() {
        let c = catalog(&["Hello"]);
        assert_eq!(match_query("   ", &c), Err(MatchError::EmptyInput));
        assert_eq!(
            match_query("zzzzzzzz", &c),
            Err(MatchError::NoMatchFound("zzzzzzzz".to_string()))
        );
        assert_eq!(match_query("  Hello  ", &c).unwrap().name, "Hello");
    }

    #[test]
    fn test_empty_catalog_has_no_match() {
        let c = catalog(&[]);
        assert!(find_match("anything", &c).is_none());
    }
}
