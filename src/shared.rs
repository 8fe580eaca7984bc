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

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::error::{Error, Result};
use crate::index::CatalogIndex;
use crate::profile::UserRating;
use crate::recommend::{self, RecommendationResult};

/// Handle to the currently published index. Rebuilding never touches a live index: a new
/// instance is published and replaces the reference, queries which already picked up the old
/// instance finish against it.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Option<Arc<CatalogIndex>>>,
}

impl SharedIndex {

    pub fn new(index: CatalogIndex) -> Self {
        SharedIndex { current: RwLock::new(Some(Arc::new(index))) }
    }

    /// A handle without any published index, every query fails until `publish` is called.
    pub fn empty() -> Self {
        SharedIndex::default()
    }

    pub fn current(&self) -> Result<Arc<CatalogIndex>> {
        let current = self.current.read()
            .map_err(|_| Error::IndexUnavailable("index lock is poisoned".to_string()))?;

        current.clone()
            .ok_or_else(|| Error::IndexUnavailable("no index has been published".to_string()))
    }

    /// Atomically replaces the published index, returning the previous one.
    pub fn publish(&self, index: CatalogIndex) -> Result<Option<Arc<CatalogIndex>>> {
        let index = Arc::new(index);

        let mut current = self.current.write()
            .map_err(|_| Error::IndexUnavailable("index lock is poisoned".to_string()))?;

        info!("Publishing index with {} items and {} dimensions", index.len(), index.dimension());

        Ok(current.replace(index))
    }

    pub fn recommend(&self, ratings: &[UserRating], top_n: usize) -> Result<RecommendationResult> {
        let index = self.current()?;
        recommend::recommend(&index, ratings, top_n)
    }
}
