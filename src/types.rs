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

use fnv::FnvHashMap;

/// A sparse vector in the weighted feature space, stored as `(index, value)` pairs with strictly
/// increasing indices. Absent indices are zero.
pub type SparseVector = Vec<(u32, f64)>;

/// Accumulator used to sum up sparse vectors before densifying them again, e.g. for centroids.
pub type SparseAccumulator = FnvHashMap<u32, f64>;

pub fn new_sparse_accumulator(capacity: usize) -> SparseAccumulator {
    FnvHashMap::with_capacity_and_hasher(capacity, Default::default())
}

/// Turns an accumulator into a sparse vector, scaling every entry by `scale`. Zero entries are
/// dropped.
pub fn to_sparse_vector(accumulator: SparseAccumulator, scale: f64) -> SparseVector {
    let mut vector: SparseVector = accumulator
        .into_iter()
        .filter(|(_, value)| *value != 0.0)
        .map(|(index, value)| (index, value * scale))
        .collect();

    vector.sort_unstable_by_key(|(index, _)| *index);
    vector
}

pub fn squared_norm(vector: &[(u32, f64)]) -> f64 {
    vector.iter().map(|(_, value)| value * value).sum()
}

pub fn norm(vector: &[(u32, f64)]) -> f64 {
    squared_norm(vector).sqrt()
}

/// Dot product of two sparse vectors via a merge over their sorted indices.
pub fn dot(a: &[(u32, f64)], b: &[(u32, f64)]) -> f64 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (index_a, value_a) = a[i];
        let (index_b, value_b) = b[j];

        if index_a == index_b {
            sum += value_a * value_b;
            i += 1;
            j += 1;
        } else if index_a < index_b {
            i += 1;
        } else {
            j += 1;
        }
    }

    sum
}

/// Cosine distance (1 - cosine similarity) given precomputed norms. A vector without any nonzero
/// entry has no direction, we treat it as orthogonal to everything (distance 1). The result is
/// clamped to [0, 2] to absorb rounding.
pub fn cosine_distance(a: &[(u32, f64)], norm_a: f64, b: &[(u32, f64)], norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let similarity = dot(a, b) / (norm_a * norm_b);
    (1.0 - similarity).max(0.0).min(2.0)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn dot_only_counts_shared_indices() {
        let a = vec![(0, 1.5), (3, 1.1), (7, 1.2)];
        let b = vec![(0, 1.5), (4, 1.1), (7, 1.2)];

        assert!((dot(&a, &b) - (2.25 + 1.44)).abs() < 1e-12);
        assert_eq!(dot(&a, &[]), 0.0);
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let a = vec![(1, 1.5), (2, 1.5), (5, 1.2)];
        let n = norm(&a);

        assert!(cosine_distance(&a, n, &a, n) < 1e-12);
    }

    #[test]
    fn disjoint_and_empty_vectors_are_orthogonal() {
        let a = vec![(1, 1.5)];
        let b = vec![(2, 1.1)];

        assert_eq!(cosine_distance(&a, norm(&a), &b, norm(&b)), 1.0);
        assert_eq!(cosine_distance(&a, norm(&a), &[], 0.0), 1.0);
    }

    #[test]
    fn accumulator_is_scaled_and_sorted() {
        let mut accumulator = new_sparse_accumulator(4);
        accumulator.insert(9, 2.4);
        accumulator.insert(2, 3.0);
        accumulator.insert(5, 0.0);

        let vector = to_sparse_vector(accumulator, 0.5);

        assert_eq!(vector, vec![(2, 1.5), (9, 1.2)]);
    }
}
