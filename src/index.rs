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

use std::time::Instant;

use fnv::FnvHashMap;
use scoped_pool::Pool;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::CatalogItem;
use crate::error::{Error, Result};
use crate::features::{Attribute, FeatureSpace, FeatureWeights, BLOCK_ORDER};
use crate::types::{self, SparseVector};
use crate::utils;
use crate::vocabulary::Vocabulary;

/// Version of the persisted snapshot layout, bump on incompatible changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// The whole catalog embedded into a feature space. Read-only after construction, so it can be
/// shared between any number of concurrently running queries.
#[derive(Debug)]
pub struct CatalogIndex {
    space: FeatureSpace,
    items: Vec<CatalogItem>,
    vectors: Vec<SparseVector>,
    norms: Vec<f64>,
    positions: FnvHashMap<String, usize>,
}

impl CatalogIndex {

    /// Fits the feature space over `catalog` and encodes every item, using `pool_size` threads
    /// for the encoding. Items keep their catalog order, independent of the pool size.
    pub fn build(
        catalog: Vec<CatalogItem>,
        weights: FeatureWeights,
        pool_size: usize,
    ) -> Result<Self> {

        let build_start = Instant::now();

        let positions = positions_of(&catalog)?;
        let space = FeatureSpace::fit(&catalog, weights);

        let pool_size = pool_size.max(1);
        let chunk_size = std::cmp::max(1, (catalog.len() + pool_size - 1) / pool_size);
        let mut vectors: Vec<SparseVector> = vec![Vec::new(); catalog.len()];

        let pool = Pool::new(pool_size);

        pool.scoped(|scope| {
            for (items, slots) in catalog.chunks(chunk_size).zip(vectors.chunks_mut(chunk_size)) {
                let space = &space;

                scope.execute(move || {
                    for (item, slot) in items.iter().zip(slots.iter_mut()) {
                        *slot = space.encode(item);
                    }
                });
            }
        });

        pool.shutdown();

        info!(
            "Encoded {} items into {} dimensions ({} genres, {} directors, {} actors) in {}ms",
            catalog.len(),
            space.dimension(),
            space.vocabulary(Attribute::Genre).len(),
            space.vocabulary(Attribute::Director).len(),
            space.vocabulary(Attribute::Actor).len(),
            utils::to_millis(build_start.elapsed()),
        );

        Ok(CatalogIndex::from_parts(space, catalog, vectors, positions))
    }

    fn from_parts(
        space: FeatureSpace,
        items: Vec<CatalogItem>,
        vectors: Vec<SparseVector>,
        positions: FnvHashMap<String, usize>,
    ) -> Self {
        let norms = vectors.iter().map(|vector| types::norm(vector)).collect();
        CatalogIndex { space, items, vectors, norms, positions }
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn dimension(&self) -> usize {
        self.space.dimension()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of an item in catalog order.
    pub fn position(&self, item_id: &str) -> Option<usize> {
        self.positions.get(item_id).cloned()
    }

    pub fn item(&self, position: usize) -> &CatalogItem {
        &self.items[position]
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn vector(&self, position: usize) -> &[(u32, f64)] {
        &self.vectors[position]
    }

    pub fn vector_of(&self, item_id: &str) -> Option<&[(u32, f64)]> {
        self.position(item_id).map(|position| self.vector(position))
    }

    pub fn norm(&self, position: usize) -> f64 {
        self.norms[position]
    }

    pub fn to_snapshot(&self) -> IndexSnapshot {
        let labels_of = |attribute| self.space.vocabulary(attribute).labels().to_vec();

        IndexSnapshot {
            version: SNAPSHOT_FORMAT_VERSION,
            block_order: BLOCK_ORDER.to_vec(),
            weights: *self.space.weights(),
            vocabularies: SnapshotVocabularies {
                genre: labels_of(Attribute::Genre),
                director: labels_of(Attribute::Director),
                actor: labels_of(Attribute::Actor),
            },
            dimension: self.space.dimension(),
            items: self.items.clone(),
            vectors: self.vectors.clone(),
        }
    }

    /// Restores an index from a persisted snapshot. Every inconsistency is reported as
    /// `IndexUnavailable`, a snapshot is either usable as a whole or not at all.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self> {

        if snapshot.version != SNAPSHOT_FORMAT_VERSION {
            return Err(unavailable(format!(
                "snapshot has version {}, expected {}", snapshot.version, SNAPSHOT_FORMAT_VERSION)));
        }

        if snapshot.block_order[..] != BLOCK_ORDER[..] {
            return Err(unavailable(format!(
                "snapshot uses block order {:?}, expected {:?}", snapshot.block_order, BLOCK_ORDER)));
        }

        if !snapshot.weights.are_valid() {
            return Err(unavailable(format!("invalid weights {:?}", snapshot.weights)));
        }

        let SnapshotVocabularies { genre, director, actor } = snapshot.vocabularies;
        let vocabulary = |attribute: Attribute, labels: Vec<String>| {
            Vocabulary::from_ordered_labels(labels).ok_or_else(|| {
                unavailable(format!("duplicate labels in {} vocabulary", attribute.name()))
            })
        };

        let space = FeatureSpace::from_parts(
            vocabulary(Attribute::Genre, genre)?,
            vocabulary(Attribute::Director, director)?,
            vocabulary(Attribute::Actor, actor)?,
            snapshot.weights,
        );

        if space.dimension() != snapshot.dimension {
            return Err(unavailable(format!(
                "vocabulary sizes sum to {}, but the snapshot declares {} dimensions",
                space.dimension(), snapshot.dimension)));
        }

        if snapshot.items.len() != snapshot.vectors.len() {
            return Err(unavailable(format!(
                "snapshot holds {} items but {} vectors", snapshot.items.len(), snapshot.vectors.len())));
        }

        for (position, vector) in snapshot.vectors.iter().enumerate() {
            validate_vector(vector, snapshot.dimension).map_err(|reason| {
                unavailable(format!("vector {} is malformed: {}", position, reason))
            })?;
        }

        let positions = positions_of(&snapshot.items)
            .map_err(|error| unavailable(error.to_string()))?;

        debug!("Restored index with {} items from snapshot", snapshot.items.len());

        Ok(CatalogIndex::from_parts(space, snapshot.items, snapshot.vectors, positions))
    }
}

/// Persisted form of a `CatalogIndex`. Vocabularies are stored as label lists in id order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    pub version: u32,
    pub block_order: Vec<Attribute>,
    pub weights: FeatureWeights,
    pub vocabularies: SnapshotVocabularies,
    pub dimension: usize,
    pub items: Vec<CatalogItem>,
    pub vectors: Vec<SparseVector>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotVocabularies {
    pub genre: Vec<String>,
    pub director: Vec<String>,
    pub actor: Vec<String>,
}

fn unavailable(reason: String) -> Error {
    Error::IndexUnavailable(reason)
}

fn positions_of(items: &[CatalogItem]) -> Result<FnvHashMap<String, usize>> {
    let mut positions: FnvHashMap<String, usize> =
        FnvHashMap::with_capacity_and_hasher(items.len(), Default::default());

    for (position, item) in items.iter().enumerate() {
        if positions.insert(item.item_id.clone(), position).is_some() {
            return Err(Error::DuplicateItem(item.item_id.clone()));
        }
    }

    Ok(positions)
}

fn validate_vector(vector: &[(u32, f64)], dimension: usize) -> std::result::Result<(), String> {
    let mut previous: Option<u32> = None;

    for &(index, value) in vector {
        if index as usize >= dimension {
            return Err(format!("index {} out of bounds", index));
        }
        if previous.map_or(false, |previous| index <= previous) {
            return Err(format!("index {} out of order", index));
        }
        if !value.is_finite() {
            return Err(format!("non-finite value at index {}", index));
        }
        previous = Some(index);
    }

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::features::DEFAULT_WEIGHTS;

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new("1", "Alien", "Horror, Sci-Fi", "Ridley Scott", "Sigourney Weaver"),
            CatalogItem::new("2", "Aliens", "Action, Sci-Fi", "James Cameron", "Sigourney Weaver"),
            CatalogItem::new("3", "Titanic", "Drama, Romance", "James Cameron", "Kate Winslet"),
            CatalogItem::new("4", "Gladiator", "Action, Drama", "Ridley Scott", "Russell Crowe"),
            CatalogItem::new("5", "Untitled", "", "", ""),
        ]
    }

    #[test]
    fn build_keeps_catalog_order_for_any_pool_size() {
        let single = CatalogIndex::build(catalog(), DEFAULT_WEIGHTS, 1).unwrap();
        let many = CatalogIndex::build(catalog(), DEFAULT_WEIGHTS, 8).unwrap();

        assert_eq!(single.len(), 5);
        for position in 0..single.len() {
            assert_eq!(single.item(position), many.item(position));
            assert_eq!(single.vector(position), many.vector(position));
        }
        assert_eq!(single.position("3"), Some(2));
        assert_eq!(single.position("unknown"), None);
    }

    #[test]
    fn items_without_labels_get_empty_vectors() {
        let index = CatalogIndex::build(catalog(), DEFAULT_WEIGHTS, 2).unwrap();

        assert!(index.vector_of("5").map_or(false, |vector| vector.is_empty()));
        assert_eq!(index.norm(4), 0.0);
    }

    #[test]
    fn duplicate_items_are_rejected() {
        let mut items = catalog();
        items.push(CatalogItem::new("2", "Aliens again", "Action", "", ""));

        match CatalogIndex::build(items, DEFAULT_WEIGHTS, 1) {
            Err(Error::DuplicateItem(item_id)) => assert_eq!(item_id, "2"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn snapshot_restores_an_equivalent_index() {
        let index = CatalogIndex::build(catalog(), DEFAULT_WEIGHTS, 2).unwrap();

        let restored = CatalogIndex::from_snapshot(index.to_snapshot()).unwrap();

        assert_eq!(restored.feature_space(), index.feature_space());
        assert_eq!(restored.items(), index.items());
        for position in 0..index.len() {
            assert_eq!(restored.vector(position), index.vector(position));
            assert_eq!(restored.norm(position), index.norm(position));
        }
    }

    fn assert_unavailable(snapshot: IndexSnapshot) {
        match CatalogIndex::from_snapshot(snapshot) {
            Err(Error::IndexUnavailable(_)) => (),
            other => panic!("expected IndexUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn snapshot_with_wrong_dimension_is_rejected() {
        let mut snapshot = CatalogIndex::build(catalog(), DEFAULT_WEIGHTS, 1).unwrap().to_snapshot();
        snapshot.dimension += 1;

        assert_unavailable(snapshot);
    }

    #[test]
    fn snapshot_with_foreign_block_order_or_version_is_rejected() {
        let snapshot = CatalogIndex::build(catalog(), DEFAULT_WEIGHTS, 1).unwrap().to_snapshot();

        let mut reordered = snapshot.clone();
        reordered.block_order.reverse();
        assert_unavailable(reordered);

        let mut newer = snapshot;
        newer.version = SNAPSHOT_FORMAT_VERSION + 1;
        assert_unavailable(newer);
    }

    #[test]
    fn snapshot_with_malformed_vectors_is_rejected() {
        let snapshot = CatalogIndex::build(catalog(), DEFAULT_WEIGHTS, 1).unwrap().to_snapshot();
        let dimension = snapshot.dimension as u32;

        let mut out_of_bounds = snapshot.clone();
        out_of_bounds.vectors[0].push((dimension, 1.2));
        assert_unavailable(out_of_bounds);

        let mut missing_vector = snapshot.clone();
        missing_vector.vectors.pop();
        assert_unavailable(missing_vector);

        let mut duplicate_label = snapshot;
        duplicate_label.vocabularies.actor.push("Kate Winslet".to_string());
        duplicate_label.dimension += 1;
        assert_unavailable(duplicate_label);
    }
}
