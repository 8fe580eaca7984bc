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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of building an index or answering a query. All of them are caused by bad input or
/// missing state, retrying will not help.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no ratings supplied")]
    EmptyRatings,

    #[error("no rating reaches the mean rating of the request")]
    NoQualifyingRatings,

    #[error("none of the rated items is part of the catalog")]
    UnknownItems,

    #[error("number of recommendations must be positive")]
    InvalidTopN,

    #[error("invalid rating {rating} for item {item_id}, ratings must lie in [1.0, 5.0]")]
    InvalidRating { item_id: String, rating: f64 },

    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("item {0} occurs more than once in the catalog")]
    DuplicateItem(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
