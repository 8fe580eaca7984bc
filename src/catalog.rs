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

/// Separator used for multi-valued attributes that arrive as a single string.
pub const LABEL_DELIMITER: char = ',';

/// Raw value of a multi-valued attribute as it arrives from a data source: either a single
/// delimited string or an already split list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LabelField {
    Delimited(String),
    List(Vec<String>),
}

impl Default for LabelField {
    fn default() -> Self {
        LabelField::List(Vec::new())
    }
}

/// Normalized set of category labels for one attribute of one item. Labels are trimmed, empty
/// labels are dropped and duplicates collapse onto their first occurrence.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {

    pub fn from_labels<I, S>(labels: I) -> Self
        where I: IntoIterator<Item=S>, S: AsRef<str> {

        let mut normalized: Vec<String> = Vec::new();

        for label in labels {
            let label = label.as_ref().trim();
            if !label.is_empty() && !normalized.iter().any(|existing| existing == label) {
                normalized.push(label.to_string());
            }
        }

        LabelSet(normalized)
    }

    pub fn from_delimited(text: &str) -> Self {
        LabelSet::from_labels(text.split(LABEL_DELIMITER))
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item=&str> {
        self.0.iter().map(|label| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<LabelField> for LabelSet {
    fn from(field: LabelField) -> Self {
        match field {
            LabelField::Delimited(text) => LabelSet::from_delimited(&text),
            // Entries of a list may themselves still carry whitespace or be blank
            LabelField::List(labels) => LabelSet::from_labels(labels),
        }
    }
}

impl<'a> From<&'a str> for LabelSet {
    fn from(text: &'a str) -> Self {
        LabelSet::from_delimited(text)
    }
}

/// A single movie in the catalog. The label sets are already normalized, so downstream code never
/// has to care whether the source delivered strings or lists.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub item_id: String,
    pub title: String,
    pub release_date: String,
    pub rating_value: Option<f64>,
    pub genres: LabelSet,
    pub directors: LabelSet,
    pub actors: LabelSet,
}

impl CatalogItem {

    /// Convenience constructor for items whose attributes are given as delimited strings.
    pub fn new(item_id: &str, title: &str, genres: &str, directors: &str, actors: &str) -> Self {
        CatalogItem {
            item_id: item_id.to_string(),
            title: title.to_string(),
            release_date: String::new(),
            rating_value: None,
            genres: LabelSet::from(genres),
            directors: LabelSet::from(directors),
            actors: LabelSet::from(actors),
        }
    }
}

/// Catalog record of a JSON catalog. Both the generic field names and the ones of the movie
/// dataset are accepted.
#[derive(Deserialize, Debug, Clone)]
pub struct CatalogRecord {
    #[serde(alias = "itemId", alias = "movieId", deserialize_with = "lenient_id")]
    pub item_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "releaseDate")]
    pub release_date: String,
    #[serde(default, alias = "ratingValue", alias = "rating", deserialize_with = "lenient_number")]
    pub rating_value: Option<f64>,
    #[serde(default)]
    pub genres: LabelField,
    #[serde(default, alias = "director")]
    pub directors: LabelField,
    #[serde(default)]
    pub actors: LabelField,
}

impl From<CatalogRecord> for CatalogItem {
    fn from(record: CatalogRecord) -> Self {
        CatalogItem {
            item_id: record.item_id.trim().to_string(),
            title: record.title,
            release_date: record.release_date,
            rating_value: record.rating_value,
            genres: record.genres.into(),
            directors: record.directors.into(),
            actors: record.actors.into(),
        }
    }
}

/// Exports of the movie dataset carry numeric ids, others use strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where D: serde::Deserializer<'de> {

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    let id = match IdValue::deserialize(deserializer)? {
        IdValue::Text(text) => text,
        IdValue::Unsigned(value) => value.to_string(),
        IdValue::Signed(value) => value.to_string(),
        IdValue::Float(value) => value.to_string(),
    };

    Ok(id)
}

/// Ratings are numbers in most exports, but some deliver (possibly empty) strings.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where D: serde::Deserializer<'de> {

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn delimited_labels_are_trimmed_and_blanks_dropped() {
        let labels = LabelSet::from(" Action, Drama ,, ,Action");

        assert_eq!(labels.labels(), &["Action".to_string(), "Drama".to_string()]);
    }

    #[test]
    fn lists_and_strings_normalize_to_the_same_set() {
        let from_list: LabelSet =
            LabelField::List(vec![" Action".to_string(), "".to_string(), "Drama".to_string()])
                .into();
        let from_text: LabelSet = LabelField::Delimited("Action,Drama".to_string()).into();

        assert_eq!(from_list, from_text);
    }

    #[test]
    fn whitespace_only_is_no_label() {
        assert!(LabelSet::from("   ").is_empty());
        assert!(LabelSet::from(LabelField::default()).is_empty());
    }

    #[test]
    fn json_records_accept_strings_and_lists() {
        let record: CatalogRecord = serde_json::from_str(r#"{
            "movieId": "42",
            "title": "Heat",
            "release_date": "1995-12-15",
            "rating": 8.3,
            "genres": ["Crime", "Thriller"],
            "director": "Michael Mann",
            "actors": "Al Pacino, Robert De Niro"
        }"#).unwrap();

        let item = CatalogItem::from(record);

        assert_eq!(item.item_id, "42");
        assert_eq!(item.rating_value, Some(8.3));
        assert_eq!(item.genres.len(), 2);
        assert_eq!(item.directors.labels(), &["Michael Mann".to_string()]);
        assert_eq!(item.actors.labels()[1], "Robert De Niro");
    }

    #[test]
    fn numeric_ids_and_textual_ratings_are_accepted() {
        let records: Vec<CatalogRecord> = serde_json::from_str(r#"[
            {"movieId": 42, "title": "Heat", "genres": "Crime", "rating": "8.3"},
            {"movieId": -7, "title": "Ronin", "rating": ""},
            {"movieId": 1.5, "title": "Odd"}
        ]"#).unwrap();

        let items: Vec<CatalogItem> = records.into_iter().map(CatalogItem::from).collect();

        assert_eq!(items[0].item_id, "42");
        assert_eq!(items[0].rating_value, Some(8.3));
        assert_eq!(items[1].item_id, "-7");
        assert_eq!(items[1].rating_value, None);
        assert_eq!(items[2].item_id, "1.5");

        assert!(serde_json::from_str::<CatalogRecord>(r#"{"movieId": [1]}"#).is_err());
    }
}
