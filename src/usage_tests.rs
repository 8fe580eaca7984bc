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

#[cfg(test)]
mod tests {

    use crate::io;
    use crate::{build_index, recommend, SharedIndex, UserRating};

    const MOVIES: &str = "\
movieId,title,release_date,rating,genres,director,actors
1,The Dark Knight,2008-07-18,9.0,\"Action, Crime, Drama\",Christopher Nolan,\"Christian Bale, Heath Ledger, Michael Caine\"
2,Batman Begins,2005-06-15,8.2,\"Action, Crime, Drama\",Christopher Nolan,\"Christian Bale, Michael Caine, Liam Neeson\"
3,The Prestige,2006-10-20,8.5,\"Drama, Mystery, Sci-Fi\",Christopher Nolan,\"Christian Bale, Hugh Jackman, Michael Caine\"
4,Inception,2010-07-16,8.8,\"Action, Adventure, Sci-Fi\",Christopher Nolan,\"Leonardo DiCaprio, Michael Caine\"
5,Heat,1995-12-15,8.3,\"Action, Crime, Drama\",Michael Mann,\"Al Pacino, Robert De Niro\"
6,Notting Hill,1999-05-28,7.2,\"Comedy, Romance\",Roger Michell,\"Julia Roberts, Hugh Grant\"
7,Love Actually,2003-11-14,7.6,\"Comedy, Drama, Romance\",Richard Curtis,\"Hugh Grant, Liam Neeson\"
";

    #[test]
    fn programmatic_usage() {

        /* The catalog comes from an external source, e.g. a CSV export. Multi-valued attributes
           are comma-delimited within their column and normalized into label sets on ingestion. */
        let catalog = io::catalog_from_csv(MOVIES.as_bytes()).unwrap();

        /* Offline, we fit one vocabulary per attribute and embed every movie into the weighted
           feature space. The resulting index is immutable. */
        let index = build_index(catalog, 2).unwrap();

        /* The user rated a few movies in this session. Only the movies rated at or above the
           mean rating (here: The Dark Knight) shape the profile. */
        let ratings = vec![
            UserRating::new("1", 5.0),
            UserRating::new("6", 2.0),
        ];

        let recommendations = recommend(&index, &ratings, 3).unwrap();

        let titles: Vec<&str> = recommendations.iter()
            .map(|recommendation| recommendation.item.title.as_str())
            .collect();

        assert_eq!(titles, vec!["Batman Begins", "Heat", "The Prestige"]);
        assert!(recommendations.entries().windows(2)
            .all(|pair| pair[0].distance <= pair[1].distance));
    }

    #[test]
    fn persisted_index_answers_identically() {
        let index = build_index(io::catalog_from_csv(MOVIES.as_bytes()).unwrap(), 1).unwrap();

        /* The index is persisted by the offline build and loaded by the online path */
        let mut snapshot: Vec<u8> = Vec::new();
        io::write_snapshot(&index, &mut snapshot).unwrap();

        let shared = SharedIndex::new(io::read_snapshot(&snapshot[..]).unwrap());

        let ratings = vec![
            UserRating::new("7", 4.5),
            UserRating::new("6", 4.0),
            UserRating::new("4", 1.5),
        ];

        let before = recommend(&index, &ratings, 4).unwrap();
        let after = shared.recommend(&ratings, 4).unwrap();

        assert_eq!(before, after);
        assert_eq!(after, shared.recommend(&ratings, 4).unwrap());
        assert!(after.iter().all(|recommendation| {
            !ratings.iter().any(|rating| rating.item_id == recommendation.item.item_id)
        }));
    }
}
