//! Normalization helpers shared by the loader and the matcher.
//!
//! - Min-max scaling of the numeric feature columns
//! - Manual genre corrections for known misclassified tracks
//! - Query cleanup and NFC match keys for fuzzy matching

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use unicode_normalization::UnicodeNormalization;

use crate::models::{Track, FEATURE_COUNT};

// ============================================================================
// Genre Corrections
// ============================================================================

/// Genre assigned to every track in `AFROBEATS_TRACKS`.
pub const AFROBEATS_GENRE: &str = "afrobeats";

/// Tracks the source playlists file under the wrong genre.
/// Matched by exact name, takes precedence over the source genre.
pub static AFROBEATS_TRACKS: Lazy<FxHashSet<&str>> = Lazy::new(|| {
    [
        "OZEBA",
        "Fi Kan We Kan",
        "Kese (Dance)",
        "alone - Remix",
        "JUJU (feat. Shallipopi)",
    ]
    .into_iter()
    .collect()
});

/// Whole-genre remaps applied after the name overrides.
pub static GENRE_REMAP: Lazy<FxHashMap<&str, &str>> = Lazy::new(|| {
    let mut m = FxHashMap::default();
    m.insert("arabic", "hip-hop");
    m
});

/// Which correction, if any, changed a track's genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreCorrection {
    Unchanged,
    NameOverride,
    Remapped,
}

/// Apply the name override, then the genre remap.
pub fn correct_genre(track: &mut Track) -> GenreCorrection {
    let mut correction = GenreCorrection::Unchanged;

    if AFROBEATS_TRACKS.contains(track.name.as_str()) {
        track.genre = AFROBEATS_GENRE.to_string();
        correction = GenreCorrection::NameOverride;
    }

    if let Some(&target) = GENRE_REMAP.get(track.genre.as_str()) {
        track.genre = target.to_string();
        correction = GenreCorrection::Remapped;
    }

    correction
}

// ============================================================================
// Min-Max Scaling
// ============================================================================

/// Per-column min-max scaler, fitted once over the whole catalog.
///
/// A constant column has its range treated as 1, so every value in it
/// scales to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    mins: [f64; FEATURE_COUNT],
    maxs: [f64; FEATURE_COUNT],
}

impl MinMaxScaler {
    pub fn fit<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a [f64; FEATURE_COUNT]>,
    {
        let mut mins = [f64::INFINITY; FEATURE_COUNT];
        let mut maxs = [f64::NEG_INFINITY; FEATURE_COUNT];
        let mut seen = false;

        for row in rows {
            seen = true;
            for (col, &v) in row.iter().enumerate() {
                mins[col] = mins[col].min(v);
                maxs[col] = maxs[col].max(v);
            }
        }

        if !seen {
            return Self {
                mins: [0.0; FEATURE_COUNT],
                maxs: [0.0; FEATURE_COUNT],
            };
        }

        Self { mins, maxs }
    }

    pub fn min(&self, col: usize) -> f64 {
        self.mins[col]
    }

    pub fn max(&self, col: usize) -> f64 {
        self.maxs[col]
    }

    pub fn transform(&self, row: &mut [f64; FEATURE_COUNT]) {
        for (col, v) in row.iter_mut().enumerate() {
            *v = self.scale(col, *v);
        }
    }

    fn scale(&self, col: usize, v: f64) -> f64 {
        let (min, max) = (self.mins[col], self.maxs[col]);
        let range = max - min;
        if range == 0.0 {
            return 0.0;
        }
        if range.is_finite() {
            return (v - min) / range;
        }
        // Finite bounds whose span overflows: work on halves
        (v / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
    }
}

// ============================================================================
// Query Cleanup
// ============================================================================

/// Regex to collapse runs of whitespace into a single space
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Trim and collapse internal whitespace. Blank input yields "".
pub fn clean_query(query: &str) -> String {
    MULTI_SPACE.replace_all(query.trim(), " ").into_owned()
}

/// Characters of `s` in Unicode NFC form, the unit the fuzzy matcher
/// compares on. ASCII text passes through unchanged.
pub fn match_key(s: &str) -> Vec<char> {
    s.nfc().collect()
}
