//! Similarity scoring and ranking.
//!
//! This module contains:
//! - Cosine similarity over audio feature vectors
//! - Genre match scoring
//! - Combined scoring and top-N ranking against a reference track

use rayon::prelude::*;

use crate::models::{Catalog, Feature, Recommendation, Track};

// ============================================================================
// Weights
// ============================================================================

/// Weight of an exact genre match in the combined score
pub const GENRE_WEIGHT: f64 = 0.6;

/// Weight of audio feature cosine similarity in the combined score
pub const AUDIO_WEIGHT: f64 = 0.4;

/// Number of recommendations the host asks for by default
pub const DEFAULT_TOP_N: usize = 5;

// ============================================================================
// Component Scores
// ============================================================================

/// Cosine similarity of two equal-length vectors.
/// A zero vector on either side scores 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "feature dimensions must match");

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

pub fn genre_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

pub fn combined_score(genre_sim: f64, audio_sim: f64) -> f64 {
    GENRE_WEIGHT * genre_sim + AUDIO_WEIGHT * audio_sim
}

// ============================================================================
// Ranking
// ============================================================================

/// Top `top_n` tracks most similar to `reference`, best first.
///
/// Every row sharing the reference's name is excluded, not just the
/// reference row. Equal scores keep catalog order. Scores are computed into
/// a fresh vector; the catalog is only read.
pub fn rank_recommendations(
    reference: &Track,
    catalog: &Catalog,
    feature_columns: &[Feature],
    top_n: usize,
) -> Vec<Recommendation> {
    if top_n == 0 {
        return Vec::new();
    }

    let reference_vector = reference.feature_vector(feature_columns);

    // par_iter + collect keeps catalog order for the stable sort below
    let mut scored: Vec<(f64, &Track)> = catalog
        .tracks()
        .par_iter()
        .filter(|t| t.name != reference.name)
        .map(|t| {
            let audio_sim = cosine_similarity(&reference_vector, &t.feature_vector(feature_columns));
            let genre_sim = genre_similarity(&t.genre, &reference.genre);
            (combined_score(genre_sim, audio_sim), t)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(top_n);

    scored
        .into_iter()
        .map(|(score, t)| Recommendation {
            name: t.name.clone(),
            artist: t.artist.clone(),
            genre: t.genre.clone(),
            score,
        })
        .collect()
}
