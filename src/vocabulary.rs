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

use crate::catalog::LabelSet;

/// Maps the labels of one attribute (e.g. all genres in the catalog) to consecutive integer ids.
///
/// Ids are assigned in lexicographic order of the labels, so fitting the same catalog twice always
/// yields the same vocabulary, independent of the order in which items are read.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    label_dict: FnvHashMap<String, u32>,
    labels: Vec<String>,
}

impl Vocabulary {

    /// Collects every distinct label from the label sets of one attribute.
    pub fn fit<'a, I>(label_sets: I) -> Self
        where I: IntoIterator<Item=&'a LabelSet> {

        let mut labels: Vec<String> = label_sets
            .into_iter()
            .flat_map(|label_set| label_set.iter())
            .map(|label| label.to_string())
            .collect();

        labels.sort_unstable();
        labels.dedup();

        Vocabulary::from_labels(labels)
    }

    /// Rebuilds a vocabulary from labels listed in id order, as stored in a snapshot. Returns
    /// `None` if a label occurs twice.
    pub fn from_ordered_labels(labels: Vec<String>) -> Option<Self> {
        let vocabulary = Vocabulary::from_labels(labels);

        if vocabulary.label_dict.len() == vocabulary.labels.len() {
            Some(vocabulary)
        } else {
            None
        }
    }

    fn from_labels(labels: Vec<String>) -> Self {
        let mut label_dict: FnvHashMap<String, u32> =
            FnvHashMap::with_capacity_and_hasher(labels.len(), Default::default());

        for (index, label) in labels.iter().enumerate() {
            label_dict.entry(label.clone()).or_insert(index as u32);
        }

        Vocabulary { label_dict, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index(&self, label: &str) -> Option<u32> {
        self.label_dict.get(label).cloned()
    }

    pub fn label(&self, index: u32) -> Option<&str> {
        self.labels.get(index as usize).map(|label| label.as_str())
    }

    /// Labels in id order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Binary indicator encoding of a label set: the sorted ids of all known labels. Labels which
    /// were not seen during `fit` are dropped, the catalog is closed-world at fit time.
    pub fn encode(&self, label_set: &LabelSet) -> Vec<u32> {
        let mut indices: Vec<u32> = label_set
            .iter()
            .filter_map(|label| self.index(label))
            .collect();

        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
