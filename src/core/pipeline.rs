use crate::core::analysis;
use crate::core::charts::{self, ChartOptions};
use crate::core::dataset::Dataset;
use crate::core::export::{records_to_csv, to_pretty_json};
use crate::core::{ConfigProvider, Pipeline, RawYearRow, Storage, TransformResult};
use crate::domain::model::{
    CleaningReport, ColumnStats, GroupBy, GroupSummary, LeapFilter, MissingPolicy, ReasonCode,
    YearGroups, YearRange,
};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Settings for one pass over a dataset.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub missing: MissingPolicy,
    pub filter: LeapFilter,
    pub year_groups: YearGroups,
    pub render_charts: bool,
    pub chart_options: ChartOptions,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            missing: MissingPolicy::default(),
            filter: LeapFilter::default(),
            year_groups: YearGroups::default(),
            render_charts: false,
            chart_options: ChartOptions::default(),
        }
    }
}

/// Runs the fixed clean → classify → aggregate → render sequence over
/// `dataset`. Shared by the batch pipeline and the web handlers.
pub fn analyze(dataset: &Dataset, options: &AnalysisOptions) -> Result<TransformResult> {
    let (cleaned, cleaning) = dataset.clean(options.missing);
    let augmented = cleaned.augment()?;
    let records = augmented.records;

    let filtered = analysis::filter(&records, options.filter);
    let charts = if options.render_charts && !records.is_empty() {
        charts::render_all(&records, &options.chart_options)?
    } else {
        Vec::new()
    };

    Ok(TransformResult {
        range: augmented.range,
        filter: options.filter,
        mean_year: analysis::mean_year(&records),
        groups_by_reason: analysis::group(&records, GroupBy::Reason, &options.year_groups),
        groups_by_year: analysis::group(&records, GroupBy::YearGroup, &options.year_groups),
        statistics: analysis::describe(&records),
        reason_codes: analysis::reason_codes(&records),
        csv_output: records_to_csv(&records, &options.year_groups)?,
        filtered_csv: records_to_csv(&filtered, &options.year_groups)?,
        mismatches: augmented.mismatches,
        cleaning,
        filtered,
        charts,
        records,
    })
}

#[derive(Serialize)]
struct GroupsDocument<'a> {
    by_reason: &'a [GroupSummary],
    by_year_group: &'a [GroupSummary],
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    generated_at: DateTime<Utc>,
    total_years: usize,
    leap_years: usize,
    year_range: Option<YearRange>,
    mean_year: Option<f64>,
    filter: String,
    filtered_years: usize,
    cleaning: &'a CleaningReport,
    mismatches: &'a [i64],
    statistics: &'a [ColumnStats],
    reason_codes: &'a [ReasonCode],
}

pub struct LeapYearPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> LeapYearPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }

    fn output_files(&self, result: &TransformResult) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();

        if self.wants("csv") {
            files.push(("leap_years.csv".to_string(), result.csv_output.clone().into_bytes()));
            files.push(("filtered.csv".to_string(), result.filtered_csv.clone().into_bytes()));
        }

        if self.wants("json") {
            let groups = GroupsDocument {
                by_reason: &result.groups_by_reason,
                by_year_group: &result.groups_by_year,
            };
            files.push(("groups.json".to_string(), to_pretty_json(&groups)?.into_bytes()));

            let summary = SummaryDocument {
                generated_at: Utc::now(),
                total_years: result.records.len(),
                leap_years: result.records.iter().filter(|r| r.is_leap).count(),
                year_range: result.range,
                mean_year: result.mean_year,
                filter: result.filter.to_string(),
                filtered_years: result.filtered.len(),
                cleaning: &result.cleaning,
                mismatches: &result.mismatches,
                statistics: &result.statistics,
                reason_codes: &result.reason_codes,
            };
            files.push(("summary.json".to_string(), to_pretty_json(&summary)?.into_bytes()));
        }

        for chart in &result.charts {
            files.push((format!("charts/{}.svg", chart.name), chart.svg.clone().into_bytes()));
        }

        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LeapYearPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawYearRow>> {
        let dataset = match self.config.input_path() {
            Some(path) => {
                tracing::debug!("Reading dataset from {}", path);
                let data = tokio::fs::read(path).await?;
                Dataset::from_csv_bytes(&data)?
            }
            None => {
                let (start, end) = self.config.sample_range();
                tracing::info!("No input file, using sample dataset {}..={}", start, end);
                Dataset::sample(start, end)
            }
        };

        tracing::debug!(
            "Dataset has {} rows, {} missing years",
            dataset.len(),
            dataset.missing_years()
        );
        Ok(dataset.into_rows())
    }

    async fn transform(&self, data: Vec<RawYearRow>) -> Result<TransformResult> {
        let options = AnalysisOptions {
            missing: self.config.missing_policy(),
            filter: self.config.filter(),
            year_groups: self.config.year_groups(),
            render_charts: self.wants("svg"),
            chart_options: ChartOptions::default(),
        };
        let result = analyze(&Dataset::from_rows(data), &options)?;

        tracing::debug!(
            cleaning = ?result.cleaning,
            "Applied filter '{}' keeping {} of {} years",
            result.filter,
            result.filtered.len(),
            result.records.len()
        );
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let files = self.output_files(&result)?;

        let Some(archive_name) = self.config.archive_name() else {
            for (name, data) in &files {
                self.storage.write_file(name, data).await?;
            }
            tracing::debug!("Wrote {} files", files.len());
            return Ok(self.config.output_path().to_string());
        };

        tracing::debug!("Creating ZIP file with {} files", files.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(format!("{}/{}", self.config.output_path(), archive_name))
    }
}
