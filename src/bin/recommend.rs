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

use std::env;
use std::error::Error;
use std::io::Write;
use std::process;

use getopts::Options;

use contentreco::io;
use contentreco::utils;
use contentreco::{UserRating, DEFAULT_TOP_N};

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("x", "index", "Index file name (required), as written by contentreco-build.",
        "PATH");
    opts.optmulti("r", "rating", "A rating of the user as ITEM=VALUE, with VALUE between 1.0 and \
        5.0 (repeatable).", "ITEM=VALUE");
    opts.optopt("R", "ratingsfile", "File with the ratings of the user, one item,rating pair \
        per line (optional, adds to the ratings given via --rating).", "PATH");
    opts.optopt("n", "num-recommendations", "Number of movies to recommend (optional, defaults \
        to 5).", "NUMBER");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return utils::print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return utils::print_usage_and_exit(&program, opts, None);
    }

    let index_path = match matches.opt_str("x") {
        Some(index_path) => index_path,
        None => {
            return utils::print_usage_and_exit(
                &program,
                opts,
                Some("Please specify an index via --index."),
            )
        },
    };

    let top_n: usize = match matches.opt_get_default("n", DEFAULT_TOP_N) {
        Ok(top_n) => top_n,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure);
            return utils::print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let mut ratings = Vec::new();
    for argument in matches.opt_strs("r") {
        match parse_rating(&argument) {
            Some(rating) => ratings.push(rating),
            None => {
                let hint = format!("Cannot parse rating '{}', expected ITEM=VALUE", argument);
                return utils::print_usage_and_exit(&program, opts, Some(&hint))
            },
        }
    }

    utils::init_logging();

    if let Err(error) = recommend(&index_path, ratings, matches.opt_str("R"), top_n) {
        eprintln!("Failed to compute recommendations: {}", error);
        process::exit(1);
    }
}

fn parse_rating(argument: &str) -> Option<UserRating> {
    let mut parts = argument.rsplitn(2, '=');
    let rating = parts.next()?.trim().parse::<f64>().ok()?;
    let item_id = parts.next()?.trim();

    Some(UserRating::new(item_id, rating))
}

fn recommend(
    index_path: &str,
    mut ratings: Vec<UserRating>,
    ratings_path: Option<String>,
    top_n: usize,
) -> Result<(), Box<dyn Error>> {

    if let Some(ratings_path) = ratings_path {
        ratings.extend(io::read_ratings(&ratings_path)?);
    }

    let index = io::read_index(index_path)?;
    let recommendations = contentreco::recommend(&index, &ratings, top_n)?;

    if recommendations.is_empty() {
        eprintln!("No recommendations found based on the given ratings.");
    }

    let mut out = io::output(None)?;
    io::write_recommendations(&recommendations, &mut out)?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::parse_rating;

    #[test]
    fn ratings_are_parsed_from_the_last_equals_sign() {
        let rating = parse_rating("Tenet=2020 = 4.5").unwrap();

        assert_eq!(rating.item_id, "Tenet=2020");
        assert_eq!(rating.rating, 4.5);
        assert!(parse_rating("42").is_none());
        assert!(parse_rating("42=great").is_none());
    }
}
