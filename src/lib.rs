//! Track recommender library - catalog loading, fuzzy matching and ranking.

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod scoring;
pub mod session;

pub use catalog::{load_catalog, load_catalog_from_reader};
pub use error::{LoadError, MatchError};
pub use matcher::{find_match, match_query};
pub use models::{Catalog, Feature, Recommendation, Track};
pub use scoring::rank_recommendations;
