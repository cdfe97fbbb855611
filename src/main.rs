//! CLI entry point for the wind rater tool.
//!
//! Reads a sound level meter export (file or URL), aggregates the wind
//! samples into time buckets, and writes or logs the resulting table.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use wind_rater::{
    config::ColumnConfig,
    fetch::load_source,
    output::{SpeedUnit, print_json, print_pretty, write_records},
    pipeline::aggregate_export,
    wind::{AggregateRecord, BucketWidth, GridOrigin},
};

#[derive(Parser)]
#[command(name = "wind_rater")]
#[command(about = "Aggregate wind samples from acoustic monitoring exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate an export and write the bucket table as CSV
    Aggregate {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// CSV file to write results to
        #[arg(short, long, default_value = "wind.csv")]
        output: String,

        /// Gzip compress the output file
        #[arg(long, default_value_t = false)]
        gzip: bool,

        #[command(flatten)]
        bucket: BucketArgs,
    },
    /// Aggregate an export and log the bucket table
    Show {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Log as JSON instead of debug output
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        bucket: BucketArgs,
    },
}

#[derive(Args)]
struct BucketArgs {
    /// Bucket width in minutes
    #[arg(short = 'b', long, default_value_t = 5)]
    bucket_minutes: i64,

    /// Grid the buckets are aligned to
    #[arg(long, value_enum, default_value_t = Origin::Epoch)]
    origin: Origin,

    /// Report mean speed in km/h instead of m/s
    #[arg(long, default_value_t = false)]
    kmh: bool,

    /// JSON file mapping timestamp/speed/direction to column headers
    #[arg(short, long)]
    columns: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Origin {
    Epoch,
    StartDay,
}

impl From<Origin> for GridOrigin {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Epoch => GridOrigin::Epoch,
            Origin::StartDay => GridOrigin::StartDay,
        }
    }
}

impl BucketArgs {
    fn unit(&self) -> SpeedUnit {
        if self.kmh {
            SpeedUnit::KilometresPerHour
        } else {
            SpeedUnit::MetresPerSecond
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/wind_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("wind_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            source,
            output,
            gzip,
            bucket,
        } => {
            let records = load_and_aggregate(&source, &bucket).await?;
            write_records(&output, &records, bucket.unit(), gzip)?;
            info!(output = %output, records = records.len(), "Wind table written");
        }
        Commands::Show {
            source,
            json,
            bucket,
        } => {
            let records = load_and_aggregate(&source, &bucket).await?;
            if json {
                print_json(&records, bucket.unit())?;
            } else {
                print_pretty(&records, bucket.unit());
            }
        }
    }

    Ok(())
}

/// Loads `source` and aggregates it with the bucket options from the CLI.
#[tracing::instrument(skip(bucket), fields(bucket_minutes = bucket.bucket_minutes))]
async fn load_and_aggregate(source: &str, bucket: &BucketArgs) -> Result<Vec<AggregateRecord>> {
    let width = BucketWidth::from_minutes(bucket.bucket_minutes)?;
    let columns = match &bucket.columns {
        Some(path) => ColumnConfig::load(path)?,
        None => ColumnConfig::default(),
    };

    let bytes = load_source(source).await?;
    aggregate_export(&bytes, &columns, width, bucket.origin.into())
}
