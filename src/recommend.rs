/**
 * ContentReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use fnv::{FnvHashMap, FnvHashSet};
use scoped_pool::Pool;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::CatalogItem;
use crate::error::{Error, Result};
use crate::index::CatalogIndex;
use crate::profile::{self, UserRating};
use crate::search::{self, Neighbor};

/// Number of recommendations to compute if the caller does not ask for a specific number.
pub const DEFAULT_TOP_N: usize = 5;

/// A recommended item with all of its display attributes and its distance to the user profile.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub distance: f64,
}

/// Recommendations for one query, ordered by ascending distance, free of duplicates and of items
/// the user rated. May be empty, which is a valid answer and not an error.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct RecommendationResult {
    entries: Vec<Recommendation>,
}

impl RecommendationResult {

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item=&Recommendation> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Recommendation> {
        self.entries
    }
}

/// Turns raw search candidates into the final result: drops rated items, keeps the closest
/// occurrence of every item, sorts by distance (ties in catalog order) and cuts off after `top_n`.
pub fn rank<'a, I>(
    candidates: Vec<Neighbor>,
    index: &CatalogIndex,
    rated_item_ids: I,
    top_n: usize,
) -> RecommendationResult
    where I: IntoIterator<Item=&'a str> {

    let rated: FnvHashSet<&str> = rated_item_ids.into_iter().collect();

    let mut closest: FnvHashMap<&str, Neighbor> =
        FnvHashMap::with_capacity_and_hasher(candidates.len(), Default::default());

    for candidate in candidates {
        let item_id = index.item(candidate.position).item_id.as_str();

        if rated.contains(item_id) {
            continue;
        }

        let kept = closest.entry(item_id).or_insert(candidate);
        if candidate < *kept {
            *kept = candidate;
        }
    }

    let mut ranked: Vec<Neighbor> = closest.into_iter().map(|(_, neighbor)| neighbor).collect();
    ranked.sort();
    ranked.truncate(top_n);

    let entries = ranked.into_iter()
        .map(|neighbor| Recommendation {
            item: index.item(neighbor.position).clone(),
            distance: neighbor.distance,
        })
        .collect();

    RecommendationResult { entries }
}

/// Recommends up to `top_n` catalog items for a user, based on the items they rated at or above
/// their mean rating. A query either succeeds as a whole or fails with a single error.
pub fn recommend(
    index: &CatalogIndex,
    ratings: &[UserRating],
    top_n: usize,
) -> Result<RecommendationResult> {

    if top_n == 0 {
        return Err(Error::InvalidTopN);
    }

    let user_profile = profile::build_profile(ratings, index)?;

    // Ask for enough neighbors to still have `top_n` left once the rated items are removed
    let k = top_n.saturating_add(user_profile.num_selected);
    let candidates = search::search(&user_profile.vector, index, k);

    debug!(
        "Profile from {} of {} rated items, {} candidates for k={}",
        user_profile.resolved.len(),
        ratings.len(),
        candidates.len(),
        k,
    );

    let result = rank(
        candidates,
        index,
        ratings.iter().map(|rating| rating.item_id.as_str()),
        top_n,
    );

    if result.is_empty() {
        info!("No recommendations left after removing the {} rated items", ratings.len());
    }

    Ok(result)
}

/// Answers many independent queries against the same index in parallel. Results are returned in
/// the order of `requests`, a failing query does not affect the others.
pub fn recommend_batch(
    index: &CatalogIndex,
    requests: &[Vec<UserRating>],
    top_n: usize,
    pool_size: usize,
) -> Vec<Result<RecommendationResult>> {

    let pool_size = pool_size.max(1);
    let chunk_size = std::cmp::max(1, (requests.len() + pool_size - 1) / pool_size);

    let chunks: Vec<&[Vec<UserRating>]> = requests.chunks(chunk_size).collect();
    let mut outputs: Vec<Vec<Result<RecommendationResult>>> =
        (0..chunks.len()).map(|_| Vec::new()).collect();

    let pool = Pool::new(pool_size);

    pool.scoped(|scope| {
        for (chunk, output) in chunks.iter().zip(outputs.iter_mut()) {
            scope.execute(move || {
                *output = chunk.iter()
                    .map(|ratings| recommend(index, ratings, top_n))
                    .collect();
            });
        }
    });

    pool.shutdown();

    outputs.into_iter().flatten().collect()
}
