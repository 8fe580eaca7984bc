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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::index::CatalogIndex;
use crate::types;

/// A catalog item (by its position in catalog order) and its cosine distance to a query vector.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f64,
}

/// Orders neighbors by distance, ties go to the item that comes first in the catalog. We need a
/// custom implementation as there is no total order on floating point numbers.
fn cmp_by_distance(neighbor_a: &Neighbor, neighbor_b: &Neighbor) -> Ordering {
    match neighbor_a.distance.partial_cmp(&neighbor_b.distance) {
        Some(Ordering::Less) => Ordering::Less,
        Some(Ordering::Greater) => Ordering::Greater,
        _ => neighbor_a.position.cmp(&neighbor_b.position),
    }
}

impl Eq for Neighbor {}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_by_distance(self, other)
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_by_distance(self, other))
    }
}

/// Exact k-nearest-neighbor search under cosine distance. Scans the whole catalog and keeps the
/// `k` closest items in a max-heap, so the farthest candidate seen so far is always on top.
/// Returns at most `k` neighbors ordered by ascending distance, then catalog order.
pub fn search(query: &[(u32, f64)], index: &CatalogIndex, k: usize) -> Vec<Neighbor> {

    if k == 0 {
        return Vec::new();
    }

    let query_norm = types::norm(query);
    let mut closest: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k.min(index.len()));

    for position in 0..index.len() {
        let distance = types::cosine_distance(
            query,
            query_norm,
            index.vector(position),
            index.norm(position),
        );

        let neighbor = Neighbor { position, distance };

        if closest.len() < k {
            closest.push(neighbor);
        } else if let Some(mut farthest) = closest.peek_mut() {
            if neighbor < *farthest {
                *farthest = neighbor;
            }
        }
    }

    closest.into_sorted_vec()
}
