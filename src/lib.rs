//! Content-based recommendations from a handful of ratings.
//!
//! Every catalog item is embedded into a weighted feature space built from its genres, directors
//! and actors. A user's ratings are turned into a profile vector (the centroid of the items they
//! rated at or above their mean rating) and the closest catalog items under cosine distance are
//! recommended.

pub mod catalog;
pub mod error;
pub mod features;
pub mod index;
pub mod io;
pub mod profile;
pub mod recommend;
pub mod search;
pub mod shared;
pub mod types;
pub mod utils;
pub mod vocabulary;

mod usage_tests;

pub use catalog::{CatalogItem, LabelSet};
pub use error::{Error, Result};
pub use features::{FeatureSpace, FeatureWeights, DEFAULT_WEIGHTS};
pub use index::CatalogIndex;
pub use profile::UserRating;
pub use recommend::{recommend, Recommendation, RecommendationResult, DEFAULT_TOP_N};
pub use shared::SharedIndex;

/// Builds the index for a catalog with the default attribute weights, encoding items on
/// `pool_size` threads.
pub fn build_index(catalog: Vec<CatalogItem>, pool_size: usize) -> Result<CatalogIndex> {
    CatalogIndex::build(catalog, DEFAULT_WEIGHTS, pool_size)
}
