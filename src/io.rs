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

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{CatalogItem, CatalogRecord, LabelSet};
use crate::error::{Error, Result};
use crate::index::{CatalogIndex, IndexSnapshot};
use crate::profile::UserRating;
use crate::recommend::{Recommendation, RecommendationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Csv,
    Json,
}

impl CatalogFormat {

    /// Guesses the format from the file extension, defaulting to CSV.
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|extension| extension.to_str()) {
            Some("json") => CatalogFormat::Json,
            _ => CatalogFormat::Csv,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Some(CatalogFormat::Csv),
            "json" => Some(CatalogFormat::Json),
            _ => None,
        }
    }
}

/// Reads a CSV file without headers, e.g. ratings.
pub fn csv_reader(file: &str, delimiter: u8) -> Result<csv::Reader<File>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(file)?;

    Ok(reader)
}

/// Catalog row of a CSV file. Multi-valued attributes are comma-delimited within their column.
#[derive(Deserialize, Debug)]
struct CatalogRow {
    #[serde(alias = "itemId", alias = "movieId")]
    item_id: String,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "releaseDate")]
    release_date: String,
    #[serde(default, alias = "ratingValue", alias = "rating")]
    rating_value: Option<f64>,
    #[serde(default)]
    genres: String,
    #[serde(default, alias = "director")]
    directors: String,
    #[serde(default)]
    actors: String,
}

impl From<CatalogRow> for CatalogItem {
    fn from(row: CatalogRow) -> Self {
        CatalogItem {
            item_id: row.item_id.trim().to_string(),
            title: row.title,
            release_date: row.release_date,
            rating_value: row.rating_value,
            genres: LabelSet::from_delimited(&row.genres),
            directors: LabelSet::from_delimited(&row.directors),
            actors: LabelSet::from_delimited(&row.actors),
        }
    }
}

/// Reads a catalog from CSV data with a header row.
pub fn catalog_from_csv<R: io::Read>(reader: R) -> Result<Vec<CatalogItem>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut catalog = Vec::new();
    for row in csv_reader.deserialize() {
        let row: CatalogRow = row?;
        catalog.push(CatalogItem::from(row));
    }

    Ok(catalog)
}

/// Reads a catalog from a JSON array of items, label attributes may be delimited strings or
/// lists of strings.
pub fn catalog_from_json<R: io::Read>(reader: R) -> Result<Vec<CatalogItem>> {
    let records: Vec<CatalogRecord> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(CatalogItem::from).collect())
}

pub fn read_catalog(file: &str, format: CatalogFormat) -> Result<Vec<CatalogItem>> {
    let reader = BufReader::new(File::open(file)?);

    let catalog = match format {
        CatalogFormat::Csv => catalog_from_csv(reader)?,
        CatalogFormat::Json => catalog_from_json(reader)?,
    };

    info!("Read {} catalog items from {}", catalog.len(), file);

    Ok(catalog)
}

/// Reads the ratings of a single user, one `item,rating` pair per line.
pub fn read_ratings(file: &str) -> Result<Vec<UserRating>> {
    let mut reader = csv_reader(file, b',')?;

    let mut ratings = Vec::new();
    for record in reader.deserialize() {
        let (item_id, rating): (String, f64) = record?;
        ratings.push(UserRating { item_id, rating });
    }

    Ok(ratings)
}

/// Reads the ratings of many users, one `user \t item \t rating` triple per line. Users are
/// returned in the order in which they first occur.
pub fn read_user_ratings(file: &str) -> Result<Vec<(String, Vec<UserRating>)>> {
    let mut reader = csv_reader(file, b'\t')?;

    let mut user_dict: FnvHashMap<String, usize> =
        FnvHashMap::with_capacity_and_hasher(100, Default::default());
    let mut users: Vec<(String, Vec<UserRating>)> = Vec::new();

    for record in reader.deserialize() {
        let (user, item_id, rating): (String, String, f64) = record?;

        let user_index = match user_dict.get(&user) {
            Some(user_index) => *user_index,
            None => {
                user_dict.insert(user.clone(), users.len());
                users.push((user, Vec::new()));
                users.len() - 1
            },
        };

        users[user_index].1.push(UserRating { item_id, rating });
    }

    Ok(users)
}

pub fn write_snapshot<W: Write>(index: &CatalogIndex, writer: W) -> Result<()> {
    serde_json::to_writer(writer, &index.to_snapshot())?;
    Ok(())
}

/// Reads and validates a persisted index. Any failure, including a missing or unreadable file,
/// leaves us without a usable index.
pub fn read_snapshot<R: io::Read>(reader: R) -> Result<CatalogIndex> {
    let snapshot: IndexSnapshot = serde_json::from_reader(reader)
        .map_err(|error| Error::IndexUnavailable(format!("malformed snapshot: {}", error)))?;

    CatalogIndex::from_snapshot(snapshot)
}

pub fn write_index(index: &CatalogIndex, file: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(Path::new(file))?);
    write_snapshot(index, &mut writer)?;
    writer.flush()?;

    info!("Wrote index with {} items to {}", index.len(), file);

    Ok(())
}

pub fn read_index(file: &str) -> Result<CatalogIndex> {
    let reader = File::open(Path::new(file))
        .map(BufReader::new)
        .map_err(|error| Error::IndexUnavailable(format!("cannot open {}: {}", file, error)))?;

    let index = read_snapshot(reader)?;

    info!("Loaded index with {} items and {} dimensions from {}",
        index.len(), index.dimension(), file);

    Ok(index)
}

/// Writes to the file at `path` if one is supplied, to stdout otherwise.
pub fn output(path: Option<String>) -> io::Result<Box<dyn Write>> {
    let out: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(File::create(Path::new(&path))?)),
        None => Box::new(io::stdout()),
    };

    Ok(out)
}

/// One JSON object per recommended item.
pub fn write_recommendations<W: Write>(
    result: &RecommendationResult,
    out: &mut W,
) -> Result<()> {

    for recommendation in result.iter() {
        serde_json::to_writer(&mut *out, recommendation)?;
        writeln!(out)?;
    }

    Ok(())
}

/// Struct used for JSON serialization of the outcome of one user's query in a batch.
#[derive(Serialize)]
struct UserRecommendations<'a> {
    user: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendations: Option<&'a [Recommendation]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn write_user_recommendations<W: Write>(
    user: &str,
    result: &Result<RecommendationResult>,
    out: &mut W,
) -> Result<()> {

    let line = match result {
        Ok(recommendations) => UserRecommendations {
            user,
            recommendations: Some(recommendations.entries()),
            error: None,
        },
        Err(error) => UserRecommendations {
            user,
            recommendations: None,
            error: Some(error.to_string()),
        },
    };

    serde_json::to_writer(&mut *out, &line)?;
    writeln!(out)?;

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::features::DEFAULT_WEIGHTS;

    const MOVIES: &str = "\
movieId,title,release_date,rating,genres,director,actors
1,Heat,1995-12-15,8.3,\"Crime, Drama\",Michael Mann,\"Al Pacino, Robert De Niro\"
2,Collateral,2004-08-06,,Crime,Michael Mann,\" Tom Cruise ,\"
3,Untitled,,,,,
";

    #[test]
    fn csv_catalog_is_normalized() {
        let catalog = catalog_from_csv(MOVIES.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].item_id, "1");
        assert_eq!(catalog[0].rating_value, Some(8.3));
        assert_eq!(catalog[0].genres.labels(), &["Crime".to_string(), "Drama".to_string()]);
        assert_eq!(catalog[1].rating_value, None);
        assert_eq!(catalog[1].actors.labels(), &["Tom Cruise".to_string()]);
        assert!(catalog[2].genres.is_empty());
        assert!(catalog[2].actors.is_empty());
    }

    #[test]
    fn json_catalog_accepts_lists() {
        let json = r#"[
            {"itemId": "1", "title": "Heat", "genres": ["Crime", "Drama"],
             "directors": ["Michael Mann"], "actors": "Al Pacino, Robert De Niro"},
            {"itemId": "2", "title": "Collateral", "genres": "Crime", "ratingValue": null}
        ]"#;

        let catalog = catalog_from_json(json.as_bytes()).unwrap();

        assert_eq!(catalog[0].genres, LabelSet::from("Crime,Drama"));
        assert_eq!(catalog[0].actors.len(), 2);
        assert!(catalog[1].directors.is_empty());
        assert_eq!(catalog[1].rating_value, None);
    }

    #[test]
    fn json_catalog_with_numeric_ids_builds_an_index() {
        let json = r#"[{"movieId": 42, "title": "Heat", "genres": "Crime"},
                       {"movieId": 7, "title": "Ronin", "genres": ["Crime", "Action"]}]"#;

        let catalog = catalog_from_json(json.as_bytes()).unwrap();
        let index = CatalogIndex::build(catalog, DEFAULT_WEIGHTS, 1).unwrap();

        assert_eq!(index.position("42"), Some(0));
        assert_eq!(index.position("7"), Some(1));
    }

    #[test]
    fn snapshot_survives_a_round_trip_through_json() {
        let index = CatalogIndex::build(
            catalog_from_csv(MOVIES.as_bytes()).unwrap(), DEFAULT_WEIGHTS, 2).unwrap();

        let mut buffer: Vec<u8> = Vec::new();
        write_snapshot(&index, &mut buffer).unwrap();
        let restored = read_snapshot(&buffer[..]).unwrap();

        assert_eq!(restored.feature_space(), index.feature_space());
        assert_eq!(restored.items(), index.items());
    }

    #[test]
    fn broken_snapshots_make_the_index_unavailable() {
        match read_snapshot("{\"version\": 1".as_bytes()) {
            Err(Error::IndexUnavailable(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }

        match read_index("/nonexistent/contentreco/index.json") {
            Err(Error::IndexUnavailable(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn batch_lines_carry_either_recommendations_or_an_error() {
        let mut out: Vec<u8> = Vec::new();

        write_user_recommendations("alice", &Ok(RecommendationResult::default()), &mut out)
            .unwrap();
        write_user_recommendations("bob", &Err(Error::EmptyRatings), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], r#"{"user":"alice","recommendations":[]}"#);
        assert_eq!(lines[1], r#"{"user":"bob","error":"no ratings supplied"}"#);
    }
}
