use crate::domain::model::{
    ColumnStats, GroupBy, GroupSummary, LeapFilter, LeapReason, ReasonCode, YearGroups,
    YearRecord,
};
use std::collections::BTreeMap;

pub fn filter(records: &[YearRecord], filter: LeapFilter) -> Vec<YearRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .copied()
        .collect()
}

pub fn mean_year(records: &[YearRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(|r| r.year as f64).sum();
    Some(sum / records.len() as f64)
}

/// Records whose year is strictly greater than the mean year.
pub fn above_mean(records: &[YearRecord]) -> (Option<f64>, Vec<YearRecord>) {
    let Some(mean) = mean_year(records) else {
        return (None, Vec::new());
    };
    let rows = records
        .iter()
        .filter(|r| r.year as f64 > mean)
        .copied()
        .collect();
    (Some(mean), rows)
}

pub fn leap_after(records: &[YearRecord], year: i64) -> Vec<YearRecord> {
    records
        .iter()
        .filter(|r| r.is_leap && r.year > year)
        .copied()
        .collect()
}

/// Positional rows `start..end`, clamped to the available records.
pub fn slice(records: &[YearRecord], start: usize, end: usize) -> &[YearRecord] {
    let end = end.min(records.len());
    let start = start.min(end);
    &records[start..end]
}

#[derive(Default)]
struct Accumulator {
    total: usize,
    leap: usize,
    earliest: i64,
    latest: i64,
}

impl Accumulator {
    fn push(&mut self, record: &YearRecord) {
        if self.total == 0 {
            self.earliest = record.year;
            self.latest = record.year;
        } else {
            self.earliest = self.earliest.min(record.year);
            self.latest = self.latest.max(record.year);
        }
        self.total += 1;
        self.leap += usize::from(record.is_leap);
    }

    fn finish(self, key: String) -> GroupSummary {
        GroupSummary {
            key,
            total_years: self.total,
            total_leap_years: self.leap,
            leap_year_ratio: self.leap as f64 / self.total as f64,
            earliest_year: self.earliest,
            latest_year: self.latest,
        }
    }
}

/// Counts, leap totals and ratios per group. Reason groups come back sorted
/// by label, year groups in bin order; empty groups are left out.
pub fn group(records: &[YearRecord], by: GroupBy, groups: &YearGroups) -> Vec<GroupSummary> {
    match by {
        GroupBy::Reason => {
            let mut buckets: BTreeMap<&'static str, Accumulator> = BTreeMap::new();
            for record in records {
                buckets.entry(record.reason.label()).or_default().push(record);
            }
            buckets
                .into_iter()
                .map(|(label, acc)| acc.finish(label.to_string()))
                .collect()
        }
        GroupBy::YearGroup => {
            let mut buckets: Vec<Accumulator> =
                groups.bins().iter().map(|_| Accumulator::default()).collect();
            for record in records {
                if let Some(idx) = groups
                    .assign(record.year)
                    .and_then(|label| groups.bins().iter().position(|b| b.label == label))
                {
                    buckets[idx].push(record);
                }
            }
            groups
                .bins()
                .iter()
                .zip(buckets)
                .filter(|(_, acc)| acc.total > 0)
                .map(|(bin, acc)| acc.finish(bin.label.clone()))
                .collect()
        }
    }
}

fn column_stats(column: &str, mut values: Vec<f64>) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;
    let median = if count % 2 == 0 {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    } else {
        values[count / 2]
    };
    let var = (count > 1).then(|| {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64
    });

    Some(ColumnStats {
        column: column.to_string(),
        count,
        sum,
        mean,
        median,
        min: values[0],
        max: values[count - 1],
        std: var.map(f64::sqrt),
        var,
    })
}

/// Summary statistics for the numeric columns: `Year`, `Leap_Code` and
/// `Year_Normalized`. Standard deviation and variance use the sample (n - 1)
/// denominator.
pub fn describe(records: &[YearRecord]) -> Vec<ColumnStats> {
    let columns: [(&str, fn(&YearRecord) -> f64); 3] = [
        ("Year", |r| r.year as f64),
        ("Leap_Code", |r| f64::from(r.leap_code())),
        ("Year_Normalized", |r| r.normalized),
    ];
    columns
        .iter()
        .filter_map(|(name, value)| column_stats(name, records.iter().map(value).collect()))
        .collect()
}

/// Occurrences per reason, most frequent first; ties ordered by label.
pub fn reason_counts(records: &[YearRecord]) -> Vec<(LeapReason, usize)> {
    let mut counts: BTreeMap<LeapReason, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.reason).or_default() += 1;
    }
    let mut counts: Vec<(LeapReason, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.label().cmp(b.0.label())));
    counts
}

/// Categorical codes for the reasons present in `records`, numbered from zero
/// in label order.
pub fn reason_codes(records: &[YearRecord]) -> Vec<ReasonCode> {
    let mut present: Vec<LeapReason> = Vec::new();
    for record in records {
        if !present.contains(&record.reason) {
            present.push(record.reason);
        }
    }
    present.sort_by_key(|reason| reason.label());
    present
        .into_iter()
        .enumerate()
        .map(|(code, reason)| ReasonCode {
            reason,
            label: reason.label(),
            code,
        })
        .collect()
}
