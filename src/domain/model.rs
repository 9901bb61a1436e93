use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which rule of the Gregorian decision table decided a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeapReason {
    #[serde(rename = "divisible_by_400")]
    DivisibleBy400,
    #[serde(rename = "divisible_by_100_not_400")]
    DivisibleBy100NotLeap,
    #[serde(rename = "divisible_by_4")]
    DivisibleBy4,
    NotDivisible,
}

impl LeapReason {
    pub const ALL: [LeapReason; 4] = [
        LeapReason::DivisibleBy400,
        LeapReason::DivisibleBy100NotLeap,
        LeapReason::DivisibleBy4,
        LeapReason::NotDivisible,
    ];

    pub fn is_leap(self) -> bool {
        matches!(self, LeapReason::DivisibleBy400 | LeapReason::DivisibleBy4)
    }

    pub fn label(self) -> &'static str {
        match self {
            LeapReason::DivisibleBy400 => "Divisible by 400",
            LeapReason::DivisibleBy100NotLeap => "Divisible by 100 but not 400",
            LeapReason::DivisibleBy4 => "Divisible by 4 but not 100",
            LeapReason::NotDivisible => "Not divisible by 4",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for LeapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_leap: bool,
    pub reason: LeapReason,
}

/// A validated min/max pair with `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    min: i64,
    max: i64,
}

impl YearRange {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if max <= min {
            return Err(EtlError::DomainError {
                min_year: min,
                max_year: max,
            });
        }
        Ok(Self { min, max })
    }

    /// Range spanned by `years`. `None` for an empty input; a `DomainError`
    /// when every year is the same.
    pub fn spanning<I: IntoIterator<Item = i64>>(years: I) -> Result<Option<Self>> {
        let mut bounds: Option<(i64, i64)> = None;
        for year in years {
            bounds = Some(match bounds {
                None => (year, year),
                Some((lo, hi)) => (lo.min(year), hi.max(year)),
            });
        }
        bounds.map(|(lo, hi)| Self::new(lo, hi)).transpose()
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, year: i64) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearRecord {
    pub year: i64,
    pub is_leap: bool,
    pub reason: LeapReason,
    pub normalized: f64,
}

impl YearRecord {
    pub fn leap_code(&self) -> u8 {
        u8::from(self.is_leap)
    }
}

/// One input row before derivation. `year` is `None` when the cell was empty
/// or not numeric; `declared_leap` is `None` when the file had no leap column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawYearRow {
    pub year: Option<i64>,
    pub declared_leap: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    #[default]
    Drop,
    FillZero,
}

impl FromStr for MissingPolicy {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "drop" => Ok(MissingPolicy::Drop),
            "fill-zero" | "fill" => Ok(MissingPolicy::FillZero),
            other => Err(EtlError::ValidationError {
                message: format!("Unknown missing-value policy '{}' (use drop or fill-zero)", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeapFilter {
    #[default]
    All,
    LeapOnly,
    NonLeapOnly,
    /// Years strictly greater than the bound.
    After(i64),
}

impl LeapFilter {
    pub fn matches(&self, record: &YearRecord) -> bool {
        match *self {
            LeapFilter::All => true,
            LeapFilter::LeapOnly => record.is_leap,
            LeapFilter::NonLeapOnly => !record.is_leap,
            LeapFilter::After(bound) => record.year > bound,
        }
    }
}

impl FromStr for LeapFilter {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        if let Some(bound) = normalized.strip_prefix("after:") {
            let year = crate::utils::validation::parse_year_input(bound)?;
            return Ok(LeapFilter::After(year));
        }
        match normalized.as_str() {
            "" | "all" => Ok(LeapFilter::All),
            "leap" => Ok(LeapFilter::LeapOnly),
            "non-leap" | "nonleap" => Ok(LeapFilter::NonLeapOnly),
            other => Err(EtlError::ValidationError {
                message: format!(
                    "Unknown filter '{}' (use all, leap, non-leap or after:<year>)",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for LeapFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeapFilter::All => f.write_str("all"),
            LeapFilter::LeapOnly => f.write_str("leap"),
            LeapFilter::NonLeapOnly => f.write_str("non-leap"),
            LeapFilter::After(year) => write!(f, "after:{}", year),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Reason,
    YearGroup,
}

impl FromStr for GroupBy {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reason" | "leap_reason" => Ok(GroupBy::Reason),
            "year_group" | "year-group" | "group" => Ok(GroupBy::YearGroup),
            other => Err(EtlError::ValidationError {
                message: format!("Unknown grouping '{}' (use reason or year_group)", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearBin {
    pub label: String,
    pub lower: i64,
    pub upper: i64,
}

/// Right-closed year bins; the first bin also includes its lower edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGroups {
    bins: Vec<YearBin>,
}

impl YearGroups {
    pub fn from_edges(edges: &[i64], labels: &[String]) -> Result<Self> {
        if edges.len() < 2 || labels.len() != edges.len() - 1 {
            return Err(EtlError::ConfigValidationError {
                field: "transform.year_groups".to_string(),
                message: format!(
                    "{} edges need exactly {} labels, got {}",
                    edges.len(),
                    edges.len().saturating_sub(1),
                    labels.len()
                ),
            });
        }
        if edges.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(EtlError::ConfigValidationError {
                field: "transform.year_groups.edges".to_string(),
                message: "Edges must be strictly increasing".to_string(),
            });
        }

        let bins = edges
            .windows(2)
            .zip(labels)
            .map(|(pair, label)| YearBin {
                label: label.clone(),
                lower: pair[0],
                upper: pair[1],
            })
            .collect();
        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[YearBin] {
        &self.bins
    }

    pub fn assign(&self, year: i64) -> Option<&str> {
        self.bins
            .iter()
            .enumerate()
            .find(|(i, bin)| {
                let above_lower = year > bin.lower || (*i == 0 && year == bin.lower);
                above_lower && year <= bin.upper
            })
            .map(|(_, bin)| bin.label.as_str())
    }
}

impl Default for YearGroups {
    fn default() -> Self {
        Self {
            bins: vec![
                YearBin {
                    label: "Before 1950".to_string(),
                    lower: 0,
                    upper: 1949,
                },
                YearBin {
                    label: "1950–1999".to_string(),
                    lower: 1949,
                    upper: 1999,
                },
                YearBin {
                    label: "2000 and later".to_string(),
                    lower: 1999,
                    upper: 2100,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub missing_years: usize,
    pub filled: usize,
    pub dropped_missing: usize,
    pub duplicates_removed: usize,
    pub rows_after: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub total_years: usize,
    pub total_leap_years: usize,
    pub leap_year_ratio: f64,
    pub earliest_year: i64,
    pub latest_year: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std: Option<f64>,
    pub var: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub name: String,
    pub svg: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReasonCode {
    pub reason: LeapReason,
    pub label: &'static str,
    pub code: usize,
}

/// Everything derived from one dataset in a single pipeline pass.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<YearRecord>,
    pub range: Option<YearRange>,
    pub filter: LeapFilter,
    pub filtered: Vec<YearRecord>,
    pub mean_year: Option<f64>,
    pub cleaning: CleaningReport,
    pub mismatches: Vec<i64>,
    pub groups_by_reason: Vec<GroupSummary>,
    pub groups_by_year: Vec<GroupSummary>,
    pub statistics: Vec<ColumnStats>,
    pub reason_codes: Vec<ReasonCode>,
    pub csv_output: String,
    pub filtered_csv: String,
    pub charts: Vec<RenderedChart>,
}
