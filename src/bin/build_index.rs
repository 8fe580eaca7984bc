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
use std::process;

use getopts::Options;

use contentreco::io::{self, CatalogFormat};
use contentreco::utils;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Catalog file name (required). Either a CSV file with a header \
        row and the columns itemId, title, releaseDate, ratingValue, genres, director, actors, \
        or a JSON array of items.", "PATH");
    opts.optopt("o", "outputfile", "File name for the index (required).", "PATH");
    opts.optopt("f", "format", "Format of the catalog file, csv or json (optional, guessed from \
        the file extension by default).", "FORMAT");
    opts.optopt("t", "threads", "Number of threads to use for encoding the catalog (optional, \
        defaults to the number of CPUs).", "NUMBER");
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

    let (catalog_path, index_path) = match (matches.opt_str("i"), matches.opt_str("o")) {
        (Some(catalog_path), Some(index_path)) => (catalog_path, index_path),
        _ => {
            return utils::print_usage_and_exit(
                &program,
                opts,
                Some("Please specify an inputfile via --inputfile and an outputfile via \
                    --outputfile."),
            )
        },
    };

    let format = match matches.opt_str("f") {
        Some(name) => match CatalogFormat::from_name(&name) {
            Some(format) => format,
            None => {
                let hint = format!("Unknown catalog format '{}'", name);
                return utils::print_usage_and_exit(&program, opts, Some(&hint))
            },
        },
        None => CatalogFormat::from_path(&catalog_path),
    };

    let num_threads: usize = match matches.opt_get_default("t", num_cpus::get()) {
        Ok(num_threads) => num_threads,
        Err(failure) => {
            let hint = format!("Problem with option 't': {}", failure);
            return utils::print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    utils::init_logging();

    if let Err(error) = build_index(&catalog_path, format, &index_path, num_threads) {
        eprintln!("Failed to build index: {}", error);
        process::exit(1);
    }
}

fn build_index(
    catalog_path: &str,
    format: CatalogFormat,
    index_path: &str,
    num_threads: usize,
) -> Result<(), Box<dyn Error>> {

    let catalog = io::read_catalog(catalog_path, format)?;
    let index = contentreco::build_index(catalog, num_threads)?;
    io::write_index(&index, index_path)?;

    Ok(())
}
