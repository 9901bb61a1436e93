use clap::Parser;
use leap_year_etl::config::toml_config::TomlConfig;
use leap_year_etl::core::ConfigProvider;
use leap_year_etl::utils::error::ErrorSeverity;
use leap_year_etl::utils::{logger, validation::Validate};
use leap_year_etl::{EtlEngine, LeapYearPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Leap-year ETL driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "leap-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the filter from config (all, leap, non-leap, after:<year>)
    #[arg(long)]
    filter: Option<String>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || matches!(config.log_level(), Some("debug" | "trace"));
    logger::init_cli_logger(verbose);

    tracing::info!("🚀 Starting TOML-based leap-year ETL");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(filter) = args.filter {
        tracing::info!("🔧 Filter overridden to: {}", filter);
        config.transform.filter = Some(filter);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = LeapYearPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Pipeline: {}", config.pipeline.name);
    if let Some(description) = &config.pipeline.description {
        tracing::info!("  Description: {}", description);
    }
    match config.input_path() {
        Some(input) => tracing::info!("  Input: {}", input),
        None => {
            let (start, end) = config.sample_range();
            tracing::info!("  Input: sample dataset {}..={}", start, end);
        }
    }
    tracing::info!("  Missing values: {:?}", config.missing_policy());
    tracing::info!("  Filter: {}", config.filter());
    tracing::info!("  Year groups: {}", config.year_groups().bins().len());
    tracing::info!("  Output: {}", config.output_path());
    tracing::info!("  Formats: {}", config.output_formats().join(", "));
    match config.archive_name() {
        Some(name) => tracing::info!("  Archive: {}", name),
        None => tracing::info!("  Archive: disabled"),
    }
}
