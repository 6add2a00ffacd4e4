//! # Docket Scraper Driver
//!
//! ## Purpose
//! Command-line entry point: parses arguments, initializes logging, runs one
//! complete scrape, and writes the output files.
//!
//! ## Input/Output Specification
//! - **Input**: Filed-date range, county selection, concurrency limit, output
//!   directory, optional TOML configuration file
//! - **Output**: `dockets.json` and `dockets.csv` in the output directory
//!   (nothing written for an empty result set)
//!
//! ## Defaults
//! Start date defaults to yesterday; end date defaults to the start date;
//! counties default to all 67.

use chrono::{Duration, Local, NaiveDate};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pa_docket_scraper::{
    config::{CountySelector, ScrapeRequest, ScraperConfig},
    output, DocketScraper, Result, ScrapeError,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("pa-docket-scraper")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scrape newly-filed criminal case dockets from the Pennsylvania UJS portal")
        .arg(
            Arg::new("start-date")
                .short('s')
                .long("start-date")
                .value_name("YYYY-MM-DD")
                .help("Start of the filed-date range (defaults to yesterday)"),
        )
        .arg(
            Arg::new("end-date")
                .short('e')
                .long("end-date")
                .value_name("YYYY-MM-DD")
                .help("End of the filed-date range (defaults to the start date)"),
        )
        .arg(
            Arg::new("counties")
                .short('C')
                .long("counties")
                .value_name("LIST")
                .default_value("all")
                .help("Comma-separated county names, or 'all'"),
        )
        .arg(
            Arg::new("concurrency")
                .short('j')
                .long("concurrency")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Maximum in-flight county requests"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .default_value(".")
                .help("Directory for dockets.json and dockets.csv"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .get_matches();

    init_logging();

    let config = match matches.get_one::<String>("config") {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::default(),
    };

    let filed_start = match matches.get_one::<String>("start-date") {
        Some(raw) => parse_cli_date("start-date", raw)?,
        None => Local::now().date_naive() - Duration::days(1),
    };
    let filed_end = matches
        .get_one::<String>("end-date")
        .map(|raw| parse_cli_date("end-date", raw))
        .transpose()?;

    let counties = parse_county_arg(matches.get_one::<String>("counties").map(String::as_str));

    let request = ScrapeRequest {
        counties,
        filed_start,
        filed_end,
        concurrency: matches.get_one::<usize>("concurrency").copied(),
    };
    let plan = request.validate(&config)?;

    info!(
        filed_start = %plan.filed_start,
        filed_end = %plan.filed_end,
        counties = plan.counties.len(),
        "scraping dockets"
    );

    let scraper = DocketScraper::new(config)?;
    let dockets = scraper.scrape(&plan).await?;

    let output_dir = PathBuf::from(matches.get_one::<String>("output-dir").map_or(".", String::as_str));
    let written = output::write_outputs(&dockets, &output_dir)?;
    for path in &written {
        info!(path = %path.display(), "output written");
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn parse_cli_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ScrapeError::Validation {
        field: field.to_string(),
        reason: format!("'{}' is not a YYYY-MM-DD date", raw),
    })
}

fn parse_county_arg(raw: Option<&str>) -> CountySelector {
    match raw {
        None => CountySelector::All,
        Some(value) if value.trim().eq_ignore_ascii_case("all") || value.trim() == "*" => {
            CountySelector::All
        }
        Some(value) => CountySelector::List(
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}
