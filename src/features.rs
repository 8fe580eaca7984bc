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

use crate::catalog::{CatalogItem, LabelSet};
use crate::types::SparseVector;
use crate::vocabulary::Vocabulary;

/// The multi-valued categorical attributes we build features from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Genre,
    Director,
    Actor,
}

/// Order in which the weighted attribute blocks are concatenated into a feature vector. Every
/// index and every snapshot built from a feature space relies on this order.
pub const BLOCK_ORDER: [Attribute; 3] = [Attribute::Genre, Attribute::Director, Attribute::Actor];

impl Attribute {

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Genre => "genre",
            Attribute::Director => "director",
            Attribute::Actor => "actor",
        }
    }

    pub fn labels_of(self, item: &CatalogItem) -> &LabelSet {
        match self {
            Attribute::Genre => &item.genres,
            Attribute::Director => &item.directors,
            Attribute::Actor => &item.actors,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FeatureWeights {
    pub genre: f64,
    pub director: f64,
    pub actor: f64,
}

/// Genres count most, then actors, then directors.
pub const DEFAULT_WEIGHTS: FeatureWeights = FeatureWeights {
    genre: 1.5,
    director: 1.1,
    actor: 1.2,
};

impl Default for FeatureWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl FeatureWeights {

    pub fn of(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Genre => self.genre,
            Attribute::Director => self.director,
            Attribute::Actor => self.actor,
        }
    }

    pub fn are_valid(&self) -> bool {
        BLOCK_ORDER.iter()
            .map(|attribute| self.of(*attribute))
            .all(|weight| weight.is_finite() && weight > 0.0)
    }
}

/// Vocabularies plus weights, which together define the dimensions and the meaning of all feature
/// vectors. Immutable once fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpace {
    genres: Vocabulary,
    directors: Vocabulary,
    actors: Vocabulary,
    weights: FeatureWeights,
}

impl FeatureSpace {

    /// Fits one vocabulary per attribute over the whole catalog.
    pub fn fit(catalog: &[CatalogItem], weights: FeatureWeights) -> Self {
        let vocabulary_for = |attribute: Attribute| {
            Vocabulary::fit(catalog.iter().map(|item| attribute.labels_of(item)))
        };

        FeatureSpace {
            genres: vocabulary_for(Attribute::Genre),
            directors: vocabulary_for(Attribute::Director),
            actors: vocabulary_for(Attribute::Actor),
            weights,
        }
    }

    pub fn from_parts(
        genres: Vocabulary,
        directors: Vocabulary,
        actors: Vocabulary,
        weights: FeatureWeights,
    ) -> Self {
        FeatureSpace { genres, directors, actors, weights }
    }

    pub fn vocabulary(&self, attribute: Attribute) -> &Vocabulary {
        match attribute {
            Attribute::Genre => &self.genres,
            Attribute::Director => &self.directors,
            Attribute::Actor => &self.actors,
        }
    }

    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    pub fn dimension(&self) -> usize {
        self.genres.len() + self.directors.len() + self.actors.len()
    }

    /// Index of the first dimension of an attribute's block.
    pub fn offset(&self, attribute: Attribute) -> usize {
        BLOCK_ORDER.iter()
            .take_while(|other| **other != attribute)
            .map(|other| self.vocabulary(*other).len())
            .sum()
    }

    /// Weighted feature vector of an item: the indicator vector of every attribute, multiplied
    /// by the attribute's weight, concatenated in block order.
    pub fn encode(&self, item: &CatalogItem) -> SparseVector {
        let num_labels = item.genres.len() + item.directors.len() + item.actors.len();
        let mut vector: SparseVector = Vec::with_capacity(num_labels);

        let mut offset = 0;
        for attribute in BLOCK_ORDER.iter() {
            let vocabulary = self.vocabulary(*attribute);
            let weight = self.weights.of(*attribute);

            for index in vocabulary.encode(attribute.labels_of(item)) {
                vector.push((offset + index, weight));
            }

            offset += vocabulary.len() as u32;
        }

        vector
    }
}
