use anyhow::Context;
use clap::Parser;
use leap_year_etl::core::dataset::{DEFAULT_SAMPLE_END, DEFAULT_SAMPLE_START};
use leap_year_etl::domain::model::MissingPolicy;
use leap_year_etl::utils::logger;
use leap_year_etl::utils::validation::validate_year_span;
use leap_year_etl::web::{self, WebConfig};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "leap-web")]
#[command(about = "Interactive leap-year checker and dataset explorer")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// First year of the sample dataset shown before any upload
    #[arg(long, default_value_t = DEFAULT_SAMPLE_START, allow_negative_numbers = true)]
    sample_start: i64,

    /// Last year of the sample dataset
    #[arg(long, default_value_t = DEFAULT_SAMPLE_END, allow_negative_numbers = true)]
    sample_end: i64,

    /// Missing value policy for uploaded files (drop, fill-zero)
    #[arg(long, default_value = "drop")]
    missing: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_json_logger(args.verbose);

    validate_year_span("sample", args.sample_start, args.sample_end)?;
    let missing: MissingPolicy = args.missing.parse()?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.host, args.port))?;

    let config = WebConfig {
        sample_start: args.sample_start,
        sample_end: args.sample_end,
        missing,
        ..WebConfig::default()
    };

    tracing::info!(
        sample_start = config.sample_start,
        sample_end = config.sample_end,
        missing = ?config.missing,
        "🚀 Starting leap-year web server"
    );
    web::run(addr, config)
        .await
        .context("Web server terminated")?;

    Ok(())
}
