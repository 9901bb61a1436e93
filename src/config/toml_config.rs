use crate::config::DEFAULT_ARCHIVE_NAME;
use crate::core::dataset::{DEFAULT_SAMPLE_END, DEFAULT_SAMPLE_START};
use crate::core::ConfigProvider;
use crate::domain::model::{LeapFilter, MissingPolicy, YearGroups};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub input: Option<String>,
    pub sample_start: Option<i64>,
    pub sample_end: Option<i64>,
    pub missing: Option<MissingPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    pub filter: Option<String>,
    pub year_groups: Option<YearGroupsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearGroupsConfig {
    pub edges: Vec<i64>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Loads and parses a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Expands `${VAR}` references; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        match &self.dataset.input {
            Some(input) => {
                validation::validate_path("dataset.input", input)?;
                validation::validate_file_extensions(
                    "dataset.input",
                    std::slice::from_ref(input),
                    &["csv"],
                )?;
            }
            None => {
                let (start, end) = self.sample_range();
                validation::validate_year_span("dataset.sample", start, end)?;
            }
        }

        if let Some(filter) = &self.transform.filter {
            filter.parse::<LeapFilter>()?;
        }
        if let Some(groups) = &self.transform.year_groups {
            YearGroups::from_edges(&groups.edges, &groups.labels)?;
        }
        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                let filename =
                    validation::validate_required_field("load.compression.filename", &compression.filename)?;
                validation::validate_non_empty_string("load.compression.filename", filename)?;
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> Option<&str> {
        self.dataset.input.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn sample_range(&self) -> (i64, i64) {
        (
            self.dataset.sample_start.unwrap_or(DEFAULT_SAMPLE_START),
            self.dataset.sample_end.unwrap_or(DEFAULT_SAMPLE_END),
        )
    }

    fn missing_policy(&self) -> MissingPolicy {
        self.dataset.missing.unwrap_or_default()
    }

    fn filter(&self) -> LeapFilter {
        self.transform
            .filter
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    }

    fn year_groups(&self) -> YearGroups {
        self.transform
            .year_groups
            .as_ref()
            .and_then(|g| YearGroups::from_edges(&g.edges, &g.labels).ok())
            .unwrap_or_default()
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        match &self.load.compression {
            Some(c) if !c.enabled => None,
            Some(c) => Some(c.filename.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME)),
            None => Some(DEFAULT_ARCHIVE_NAME),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[pipeline]
name = "leap-years"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.pipeline.name, "leap-years");
        assert!(config.input_path().is_none());
        assert_eq!(config.sample_range(), (1900, 2050));
        assert_eq!(config.missing_policy(), MissingPolicy::Drop);
        assert_eq!(config.filter(), LeapFilter::All);
        assert_eq!(config.year_groups(), YearGroups::default());
        assert_eq!(config.archive_name(), Some(DEFAULT_ARCHIVE_NAME));
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "custom"
description = "Custom bins"
version = "1.0"

[dataset]
input = "leap_years.csv"
missing = "fill_zero"

[transform]
filter = "leap"

[transform.year_groups]
edges = [1800, 1900, 2000]
labels = ["19th century", "20th century"]

[load]
output_path = "./out"
output_formats = ["csv", "json", "svg"]

[load.compression]
enabled = true
filename = "bundle.zip"

[monitoring]
enabled = true
log_level = "debug"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_path(), Some("leap_years.csv"));
        assert_eq!(config.missing_policy(), MissingPolicy::FillZero);
        assert_eq!(config.filter(), LeapFilter::LeapOnly);
        assert_eq!(config.year_groups().assign(1850), Some("19th century"));
        assert_eq!(config.archive_name(), Some("bundle.zip"));
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_disabled_compression_writes_loose_files() {
        let toml_content = format!(
            "{}\n[load.compression]\nenabled = false\n",
            MINIMAL.trim_end()
        );
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.archive_name(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LEAP_TEST_OUTPUT_DIR", "/tmp/leap-output");

        let toml_content = r#"
[pipeline]
name = "env"

[load]
output_path = "${LEAP_TEST_OUTPUT_DIR}"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "/tmp/leap-output");

        std::env::remove_var("LEAP_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = MINIMAL.replace(r#"["csv"]"#, r#"["xlsx"]"#);
        let config = TomlConfig::from_toml_str(&bad_format).unwrap();
        assert!(config.validate().is_err());

        let bad_groups = format!(
            "{}\n[transform.year_groups]\nedges = [2000, 1900]\nlabels = [\"x\"]\n",
            MINIMAL.trim_end()
        );
        let config = TomlConfig::from_toml_str(&bad_groups).unwrap();
        assert!(config.validate().is_err());

        let bad_span = MINIMAL.replace(
            "[load]",
            "[dataset]\nsample_start = 2000\nsample_end = 1999\n\n[load]",
        );
        let config = TomlConfig::from_toml_str(&bad_span).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "leap-years");
    }
}
