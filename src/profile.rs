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

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::index::CatalogIndex;
use crate::types::{self, SparseVector};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// A rating a user gave to a catalog item in the current session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserRating {
    pub item_id: String,
    pub rating: f64,
}

impl UserRating {
    pub fn new(item_id: &str, rating: f64) -> Self {
        UserRating { item_id: item_id.to_string(), rating }
    }
}

/// Query point for the neighbor search, the centroid of the feature vectors of the items the user
/// rated at least as high as their mean rating.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub vector: SparseVector,
    pub norm: f64,
    /// Number of distinct items rated at or above the mean, resolvable or not.
    pub num_selected: usize,
    /// Positions of the selected items which are part of the catalog.
    pub resolved: Vec<usize>,
}

/// Items rated at or above the mean of all supplied ratings, in request order and without
/// duplicates. Only membership counts, not how far a rating lies above the mean.
pub fn select_above_mean(ratings: &[UserRating]) -> Result<Vec<&str>> {

    if ratings.is_empty() {
        return Err(Error::EmptyRatings);
    }

    for rating in ratings {
        if !rating.rating.is_finite() || rating.rating < MIN_RATING || rating.rating > MAX_RATING {
            return Err(Error::InvalidRating {
                item_id: rating.item_id.clone(),
                rating: rating.rating,
            });
        }
    }

    let mean = ratings.iter().map(|rating| rating.rating).sum::<f64>() / ratings.len() as f64;

    let mut selected: Vec<&str> = Vec::with_capacity(ratings.len());
    for rating in ratings.iter().filter(|rating| rating.rating >= mean) {
        if !selected.contains(&rating.item_id.as_str()) {
            selected.push(&rating.item_id);
        }
    }

    debug!("{} of {} ratings reach the mean rating {}", selected.len(), ratings.len(), mean);

    // Only possible if rounding pushes the mean above every single rating
    if selected.is_empty() {
        return Err(Error::NoQualifyingRatings);
    }

    Ok(selected)
}

pub fn build_profile(ratings: &[UserRating], index: &CatalogIndex) -> Result<UserProfile> {

    let selected = select_above_mean(ratings)?;

    let resolved: Vec<usize> = selected.iter()
        .filter_map(|item_id| {
            let position = index.position(item_id);
            if position.is_none() {
                warn!("Ignoring rated item {}, it is not part of the catalog", item_id);
            }
            position
        })
        .collect();

    if resolved.is_empty() {
        return Err(Error::UnknownItems);
    }

    let mut accumulator = types::new_sparse_accumulator(index.vector(resolved[0]).len() * 2);

    for position in resolved.iter() {
        for &(dimension, value) in index.vector(*position) {
            *accumulator.entry(dimension).or_insert(0.0) += value;
        }
    }

    let vector = types::to_sparse_vector(accumulator, 1.0 / resolved.len() as f64);
    let norm = types::norm(&vector);

    Ok(UserProfile { vector, norm, num_selected: selected.len(), resolved })
}
