pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::dataset::{DEFAULT_SAMPLE_END, DEFAULT_SAMPLE_START};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{LeapFilter, MissingPolicy, YearGroups};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_ARCHIVE_NAME: &str = "leap_year_output.zip";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "leap-year-etl")]
#[command(about = "Classify, clean, aggregate and chart a leap-year dataset")]
pub struct CliConfig {
    /// CSV file with a Year column; the built-in sample is used when omitted
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_START, allow_negative_numbers = true)]
    pub sample_start: i64,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_END, allow_negative_numbers = true)]
    pub sample_end: i64,

    /// How rows without a usable year are handled: drop or fill-zero
    #[arg(long, default_value = "drop")]
    pub missing: String,

    /// all, leap, non-leap or after:<year>
    #[arg(long, default_value = "all")]
    pub filter: String,

    #[arg(long, value_delimiter = ',', default_values = ["csv", "json", "svg"])]
    pub formats: Vec<String>,

    /// Write loose files instead of a ZIP archive
    #[arg(long)]
    pub no_compression: bool,

    /// Classify a single year and exit
    #[arg(long, allow_negative_numbers = true)]
    pub check_year: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    fn parsed_filter(&self) -> Result<LeapFilter> {
        self.filter.parse()
    }

    fn parsed_missing(&self) -> Result<MissingPolicy> {
        self.missing.parse()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;
        if let Some(input) = &self.input {
            validation::validate_path("input", input)?;
            validation::validate_file_extensions("input", std::slice::from_ref(input), &["csv"])?;
        } else {
            validation::validate_year_span("sample", self.sample_start, self.sample_end)?;
        }
        validation::validate_output_formats("formats", &self.formats)?;
        self.parsed_filter()?;
        self.parsed_missing()?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> Option<&str> {
        self.input.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn sample_range(&self) -> (i64, i64) {
        (self.sample_start, self.sample_end)
    }

    fn missing_policy(&self) -> MissingPolicy {
        self.parsed_missing().unwrap_or_default()
    }

    fn filter(&self) -> LeapFilter {
        self.parsed_filter().unwrap_or_default()
    }

    fn year_groups(&self) -> YearGroups {
        YearGroups::default()
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> Option<&str> {
        (!self.no_compression).then_some(DEFAULT_ARCHIVE_NAME)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::parse_from(std::iter::once("leap-year-etl").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert!(config.input_path().is_none());
        assert_eq!(config.sample_range(), (1900, 2050));
        assert_eq!(config.filter(), LeapFilter::All);
        assert_eq!(config.missing_policy(), MissingPolicy::Drop);
        assert_eq!(config.output_formats(), &["csv", "json", "svg"]);
        assert_eq!(config.archive_name(), Some(DEFAULT_ARCHIVE_NAME));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--input",
            "data/leap_years.csv",
            "--filter",
            "after:1999",
            "--missing",
            "fill-zero",
            "--formats",
            "csv",
            "--no-compression",
        ]);
        assert_eq!(config.input_path(), Some("data/leap_years.csv"));
        assert_eq!(config.filter(), LeapFilter::After(1999));
        assert_eq!(config.missing_policy(), MissingPolicy::FillZero);
        assert_eq!(config.archive_name(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        assert!(parse(&["--input", "years.xlsx"]).validate().is_err());
        assert!(parse(&["--filter", "sometimes"]).validate().is_err());
        assert!(parse(&["--formats", "png"]).validate().is_err());
        assert!(parse(&["--sample-start", "2000", "--sample-end", "2000"])
            .validate()
            .is_err());
    }
}
