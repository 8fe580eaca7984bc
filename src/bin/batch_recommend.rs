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
use std::time::Instant;

use getopts::Options;
use tracing::info;

use contentreco::io;
use contentreco::recommend::recommend_batch;
use contentreco::utils;
use contentreco::DEFAULT_TOP_N;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("x", "index", "Index file name (required), as written by contentreco-build.",
        "PATH");
    opts.optopt("i", "inputfile", "Ratings file name (required). The input must contain a user, \
        item and rating triple per line, separated by tabs.", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("n", "num-recommendations", "Number of movies to recommend per user (optional, \
        defaults to 5).", "NUMBER");
    opts.optopt("t", "threads", "Number of threads to use (optional, defaults to the number of \
        CPUs).", "NUMBER");
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

    let (index_path, ratings_path) = match (matches.opt_str("x"), matches.opt_str("i")) {
        (Some(index_path), Some(ratings_path)) => (index_path, ratings_path),
        _ => {
            return utils::print_usage_and_exit(
                &program,
                opts,
                Some("Please specify an index via --index and an inputfile via --inputfile."),
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

    let num_threads: usize = match matches.opt_get_default("t", num_cpus::get()) {
        Ok(num_threads) => num_threads,
        Err(failure) => {
            let hint = format!("Problem with option 't': {}", failure);
            return utils::print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    utils::init_logging();

    let outcome = batch_recommend(
        &index_path,
        &ratings_path,
        matches.opt_str("o"),
        top_n,
        num_threads,
    );

    if let Err(error) = outcome {
        eprintln!("Failed to compute recommendations: {}", error);
        process::exit(1);
    }
}

fn batch_recommend(
    index_path: &str,
    ratings_path: &str,
    recommendations_path: Option<String>,
    top_n: usize,
    num_threads: usize,
) -> Result<(), Box<dyn Error>> {

    let index = io::read_index(index_path)?;

    info!("Reading ratings from {}", ratings_path);
    let user_ratings = io::read_user_ratings(ratings_path)?;

    let (users, requests): (Vec<String>, Vec<_>) = user_ratings.into_iter().unzip();

    let batch_start = Instant::now();
    let results = recommend_batch(&index, &requests, top_n, num_threads);

    let num_failed = results.iter().filter(|result| result.is_err()).count();
    info!(
        "Computed recommendations for {} users ({} failed) in {}ms",
        users.len(),
        num_failed,
        utils::to_millis(batch_start.elapsed()),
    );

    let mut out = io::output(recommendations_path)?;
    for (user, result) in users.iter().zip(results.iter()) {
        io::write_user_recommendations(user, result, &mut out)?;
    }
    out.flush()?;

    Ok(())
}
