mod commands;
mod config;

use anyhow::Result;
use clap::{App, AppSettings, Arg};
use std::str::FromStr;
use tracing::{subscriber::set_global_default, Level};

fn main() -> Result<()> {
    let matches = App::new("mondrian")
        .version("0.1.0")
        .about("Mondrian k-anonymization of CSV tables")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .takes_value(true)
                .global(true)
                .default_value("INFO")
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            App::new("anonymize")
                .about("Partitions a dataset and prints or writes the generalized table")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .takes_value(true)
                        .default_value("./mondrian.toml")
                        .help("Path to the config file to use"),
                )
                .arg(
                    Arg::new("rects")
                        .long("rects")
                        .takes_value(true)
                        .number_of_values(2)
                        .value_names(&["X", "Y"])
                        .help("Prints the partition rectangles on two columns instead"),
                ),
        )
        .subcommand(
            App::new("inspect")
                .about("Prints the inferred column kinds and spans of a CSV file")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .help("Path to the CSV file to inspect"),
                )
                .arg(
                    Arg::new("emit-config")
                        .long("emit-config")
                        .help("Prints a starting config file for the dataset"),
                ),
        )
        .get_matches();

    let tracing_level = Level::from_str(matches.value_of("verbosity").unwrap_or("INFO"))?;

    let collector = tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .finish();

    set_global_default(collector)?;

    match matches.subcommand() {
        Some(("anonymize", matches)) => commands::anonymize::execute(matches),
        Some(("inspect", matches)) => commands::inspect::execute(matches),
        _ => unreachable!("a subcommand is required"),
    }
}
