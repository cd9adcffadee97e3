#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the SafeWorld crime data pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use safeworld_cli_utils::IndicatifProgress;
use safeworld_emit::report::summary_report;
use safeworld_pipeline::{all_failed, run_all};
use safeworld_source::fetch::RawFetcher;
use safeworld_source::paths::DataLayout;
use safeworld_source::raw_store::RawStore;
use safeworld_source::registry::{all_cities, load_city_file, select_cities, with_overrides};
use safeworld_source_models::CitySource;

#[derive(Parser)]
#[command(name = "safeworld", about = "Borough-level crime safety pipeline")]
struct Cli {
    /// Data directory holding `raw/` inputs and `processed/` outputs
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,
    /// City to process (repeatable, e.g. `--city london --city nyc`).
    /// Defaults to every configured city.
    #[arg(long = "city", global = true)]
    cities: Vec<String>,
    /// Extra city definition TOML file (repeatable). Replaces the built-in
    /// city with the same id.
    #[arg(long = "city-config", global = true)]
    city_configs: Vec<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, score, merge, and write artifacts for each city, then print
    /// the summary report
    Run,
    /// Print the summary report from existing artifacts
    Report,
}

fn load_cities(cli: &Cli) -> Result<Vec<CitySource>, Box<dyn std::error::Error>> {
    let overrides = cli
        .city_configs
        .iter()
        .map(|path| load_city_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(select_cities(
        with_overrides(all_cities(), overrides),
        &cli.cities,
    )?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = safeworld_cli_utils::init_logger();
    let cli = Cli::parse();

    let cities = load_cities(&cli)?;
    let ids: Vec<&str> = cities.iter().map(|c| c.id.as_str()).collect();
    let layout = DataLayout::new(cli.data_dir.clone());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let fetcher = RawFetcher::new(RawStore::new(layout.clone()))?;
            let outcomes =
                run_all(&cities, &layout, &fetcher, |_| IndicatifProgress::steps_bar(&multi)).await;

            multi.clear().ok();
            for outcome in &outcomes {
                println!("{}", outcome.status_line());
            }
            println!();
            print!("{}", summary_report(&layout, &ids));

            if all_failed(&outcomes) {
                return Err("every selected city failed".into());
            }
        }
        Commands::Report => {
            print!("{}", summary_report(&layout, &ids));
        }
    }

    Ok(())
}
