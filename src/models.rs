//! Core data models for the recommender.
//!
//! This module contains the track record, the feature column enum, the
//! immutable catalog and the recommendation row returned by the ranker.

use serde::Serialize;

use crate::normalize::{match_key, MinMaxScaler};

// ============================================================================
// Feature Columns
// ============================================================================

/// Numeric columns that are min-max scaled at load time and used as the
/// audio feature vector during ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Danceability,
    Energy,
    Tempo,
    Valence,
    Acousticness,
    Instrumentalness,
    Popularity,
}

impl Feature {
    /// All scaled columns, in feature vector order.
    pub const ALL: [Feature; 7] = [
        Feature::Danceability,
        Feature::Energy,
        Feature::Tempo,
        Feature::Valence,
        Feature::Acousticness,
        Feature::Instrumentalness,
        Feature::Popularity,
    ];

    /// Position of this feature inside `Track::features`.
    pub fn index(self) -> usize {
        match self {
            Feature::Danceability => 0,
            Feature::Energy => 1,
            Feature::Tempo => 2,
            Feature::Valence => 3,
            Feature::Acousticness => 4,
            Feature::Instrumentalness => 5,
            Feature::Popularity => 6,
        }
    }

    /// Column header in the source CSV.
    pub fn column(self) -> &'static str {
        match self {
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Tempo => "tempo",
            Feature::Valence => "valence",
            Feature::Acousticness => "acousticness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Popularity => "track_popularity",
        }
    }
}

pub const FEATURE_COUNT: usize = Feature::ALL.len();

// ============================================================================
// Track
// ============================================================================

/// A single catalog row.
///
/// After loading, every entry of `features` lies in [0, 1] and `genre` has
/// already had the manual corrections applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub genre: String,
    pub features: [f64; FEATURE_COUNT], // indexed by Feature::index
}

impl Track {
    pub fn feature(&self, feature: Feature) -> f64 {
        self.features[feature.index()]
    }

    pub fn popularity(&self) -> f64 {
        self.feature(Feature::Popularity)
    }

    /// Feature vector over the given columns, in the order given.
    pub fn feature_vector(&self, columns: &[Feature]) -> Vec<f64> {
        columns.iter().map(|&c| self.feature(c)).collect()
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Deduplicated, normalized, genre-corrected tracks in source order.
///
/// The catalog is never mutated after load. Ranking borrows it immutably and
/// keeps its scores in request-local storage, so a single catalog can be
/// shared across threads behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Catalog {
    tracks: Vec<Track>,
    name_keys: Vec<Vec<char>>, // NFC chars of each track name, same order as tracks
    scaler: MinMaxScaler,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>, scaler: MinMaxScaler) -> Self {
        let name_keys = tracks.iter().map(|t| match_key(&t.name)).collect();
        Self {
            tracks,
            name_keys,
            scaler,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Precomputed fuzzy match keys, parallel to `tracks()`.
    pub fn name_keys(&self) -> &[Vec<char>] {
        &self.name_keys
    }

    pub fn get(&self, idx: usize) -> Option<&Track> {
        self.tracks.get(idx)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Scaling parameters fitted at load time.
    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    /// Index of a track borrowed from this catalog.
    pub fn position_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| std::ptr::eq(t, track))
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// One ranked recommendation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub artist: String,
    pub genre: String,
    pub score: f64, // 0.6 * genre match + 0.4 * audio cosine
}
