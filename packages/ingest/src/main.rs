#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the incident ingestion job.

use clap::{Parser, Subcommand};
use la_crime_database::store::SqliteRecordStore;
use la_crime_ingest::{DEFAULT_START_DATE, all_sources, load, parse_start_date, resolve_source};
use la_crime_source::registry::DEFAULT_SOURCE_ID;

#[derive(Parser)]
#[command(name = "la_crime_ingest", about = "LA crime data ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all records from a source and replace the stored incidents
    Load {
        /// Source identifier (e.g., "`la_arrests`")
        #[arg(long, default_value = DEFAULT_SOURCE_ID)]
        source: String,
        /// Earliest arrest date to fetch (ISO-8601 date or date-time)
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start_date: String,
        /// Maximum number of records to fetch (for testing)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// List all configured data sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sources => {
            let sources = all_sources();
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(50));
            for source in &sources {
                println!("{:<20} {}", source.id(), source.name());
            }
        }
        Commands::Load {
            source,
            start_date,
            limit,
        } => {
            let src = resolve_source(&source)?;
            let since = parse_start_date(&start_date)?;
            let store = SqliteRecordStore::open_from_env().await?;

            let summary = load(&store, &src, since, limit).await?;
            println!(
                "{}: stored {} of {} fetched records in {:.1}s",
                summary.source_id,
                summary.stored,
                summary.fetched,
                summary.elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}
