use crate::domain::classifier::{classify, derive_record};
use crate::domain::model::{CleaningReport, MissingPolicy, RawYearRow, YearRange, YearRecord};
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;
use std::io::Read;

pub const YEAR_COLUMN: &str = "Year";
pub const LEAP_COLUMN: &str = "Is_Leap_Year";

pub const DEFAULT_SAMPLE_START: i64 = 1900;
pub const DEFAULT_SAMPLE_END: i64 = 2050;

/// Rows as loaded from a CSV file or the built-in sample, before derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<RawYearRow>,
    columns: Vec<String>,
}

/// Output of [`Dataset::augment`].
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedDataset {
    pub records: Vec<YearRecord>,
    pub range: Option<YearRange>,
    /// Years whose declared `Is_Leap_Year` disagrees with the Gregorian rule.
    pub mismatches: Vec<i64>,
    pub skipped_missing: usize,
}

impl Dataset {
    pub fn from_rows(rows: Vec<RawYearRow>) -> Self {
        let mut columns = vec![YEAR_COLUMN.to_string()];
        if rows.iter().any(|row| row.declared_leap.is_some()) {
            columns.push(LEAP_COLUMN.to_string());
        }
        Self { rows, columns }
    }

    /// One row per year in `start..=end`, with the leap column filled in.
    pub fn sample(start: i64, end: i64) -> Self {
        let rows = (start..=end)
            .map(|year| RawYearRow {
                year: Some(year),
                declared_leap: Some(classify(year).is_leap),
            })
            .collect();
        Self {
            rows,
            columns: vec![YEAR_COLUMN.to_string(), LEAP_COLUMN.to_string()],
        }
    }

    pub fn default_sample() -> Self {
        Self::sample(DEFAULT_SAMPLE_START, DEFAULT_SAMPLE_END)
    }

    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        Self::from_csv_reader(data)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();

        let year_idx = find_year_column(&columns).ok_or_else(|| EtlError::MissingColumnError {
            column: YEAR_COLUMN.to_string(),
        })?;
        let leap_idx = columns.iter().position(|c| c == LEAP_COLUMN);

        if columns[year_idx] != YEAR_COLUMN {
            tracing::info!("Using '{}' as the {} column", columns[year_idx], YEAR_COLUMN);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let year = record.get(year_idx).and_then(parse_year_cell);
            let declared_leap = leap_idx.map(|idx| parse_leap_cell(record.get(idx).unwrap_or("")));
            rows.push(RawYearRow {
                year,
                declared_leap,
            });
        }

        tracing::debug!("Loaded {} rows with columns {:?}", rows.len(), columns);
        Ok(Self { rows, columns })
    }

    pub fn rows(&self) -> &[RawYearRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<RawYearRow> {
        self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn head(&self, n: usize) -> &[RawYearRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn tail(&self, n: usize) -> &[RawYearRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    pub fn missing_years(&self) -> usize {
        self.rows.iter().filter(|row| row.year.is_none()).count()
    }

    /// Handles missing years according to `policy`, then drops duplicate rows
    /// keeping the first occurrence.
    pub fn clean(&self, policy: MissingPolicy) -> (Dataset, CleaningReport) {
        let mut report = CleaningReport {
            rows_before: self.rows.len(),
            missing_years: self.missing_years(),
            ..CleaningReport::default()
        };

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let row = match (row.year, policy) {
                (Some(_), _) => *row,
                (None, MissingPolicy::FillZero) => {
                    report.filled += 1;
                    RawYearRow {
                        year: Some(0),
                        ..*row
                    }
                }
                (None, MissingPolicy::Drop) => {
                    report.dropped_missing += 1;
                    continue;
                }
            };
            if seen.insert(row) {
                rows.push(row);
            } else {
                report.duplicates_removed += 1;
            }
        }
        report.rows_after = rows.len();

        tracing::debug!(?report, "Cleaned dataset");
        (
            Dataset {
                rows,
                columns: self.columns.clone(),
            },
            report,
        )
    }

    /// Derives one record per row that has a year, normalizing against the
    /// dataset's own year range.
    pub fn augment(&self) -> Result<AugmentedDataset> {
        let years: Vec<i64> = self.rows.iter().filter_map(|row| row.year).collect();
        let skipped_missing = self.rows.len() - years.len();
        if skipped_missing > 0 {
            tracing::warn!("{} rows without a year were skipped", skipped_missing);
        }

        let range = YearRange::spanning(years.iter().copied())?;
        let records = match &range {
            Some(range) => years
                .iter()
                .map(|&year| derive_record(year, range))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let mismatches: Vec<i64> = self
            .rows
            .iter()
            .filter_map(|row| match (row.year, row.declared_leap) {
                (Some(year), Some(declared)) if declared != classify(year).is_leap => Some(year),
                _ => None,
            })
            .collect();
        if !mismatches.is_empty() {
            tracing::warn!(
                "{} rows declare a leap status that contradicts the Gregorian rule",
                mismatches.len()
            );
        }

        Ok(AugmentedDataset {
            records,
            range,
            mismatches,
            skipped_missing,
        })
    }
}

fn find_year_column(columns: &[String]) -> Option<usize> {
    columns.iter().position(|c| c == YEAR_COLUMN).or_else(|| {
        columns
            .iter()
            .position(|c| c != LEAP_COLUMN && c.to_ascii_lowercase().contains("year"))
    })
}

/// Accepts integers and integral floats such as `2000.0`; anything else is
/// treated as missing.
fn parse_year_cell(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(year) = cell.parse::<i64>() {
        return Some(year);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn parse_leap_cell(cell: &str) -> bool {
    matches!(
        cell.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
