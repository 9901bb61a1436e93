//! Proleptic Gregorian leap-year classification and the derived per-year
//! features built on top of it.

use crate::domain::model::{Classification, LeapReason, YearRange, YearRecord};
use crate::utils::error::{EtlError, Result};

/// Classifies `year` using the Gregorian decision table, first match wins:
/// divisible by 400, then by 100, then by 4. Total over every integer,
/// including zero and negative years.
pub fn classify(year: i64) -> Classification {
    let reason = if year % 400 == 0 {
        LeapReason::DivisibleBy400
    } else if year % 100 == 0 {
        LeapReason::DivisibleBy100NotLeap
    } else if year % 4 == 0 {
        LeapReason::DivisibleBy4
    } else {
        LeapReason::NotDivisible
    };

    Classification {
        is_leap: reason.is_leap(),
        reason,
    }
}

pub fn is_leap(year: i64) -> bool {
    classify(year).is_leap
}

/// Min-max scales `year` into `[min_year, max_year]`. Years outside the
/// range map outside `[0, 1]`.
pub fn normalize(year: i64, min_year: i64, max_year: i64) -> Result<f64> {
    if max_year <= min_year {
        return Err(EtlError::DomainError { min_year, max_year });
    }
    let offset = i128::from(year) - i128::from(min_year);
    let span = i128::from(max_year) - i128::from(min_year);
    Ok(offset as f64 / span as f64)
}

pub fn derive_record(year: i64, range: &YearRange) -> Result<YearRecord> {
    let Classification { is_leap, reason } = classify(year);
    Ok(YearRecord {
        year,
        is_leap,
        reason,
        normalized: normalize(year, range.min(), range.max())?,
    })
}

/// Derives records for a whole column, normalizing against the column's own
/// min and max.
pub fn derive_records(years: &[i64]) -> Result<Vec<YearRecord>> {
    let Some(range) = YearRange::spanning(years.iter().copied())? else {
        return Ok(Vec::new());
    };
    years
        .iter()
        .map(|&year| derive_record(year, &range))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(year: i64) -> bool {
        year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
    }

    #[test]
    fn test_boundary_years() {
        let cases = [
            (2000, true, LeapReason::DivisibleBy400),
            (1900, false, LeapReason::DivisibleBy100NotLeap),
            (2024, true, LeapReason::DivisibleBy4),
            (2023, false, LeapReason::NotDivisible),
            (0, true, LeapReason::DivisibleBy400),
        ];
        for (year, leap, reason) in cases {
            let result = classify(year);
            assert_eq!(result.is_leap, leap, "year {}", year);
            assert_eq!(result.reason, reason, "year {}", year);
        }
    }

    #[test]
    fn test_classify_agrees_with_rule_over_wide_range() {
        for year in -2000..=4000 {
            let result = classify(year);
            assert_eq!(result.is_leap, rule(year), "year {}", year);
            assert_eq!(result.reason.is_leap(), result.is_leap);
        }
    }

    #[test]
    fn test_reason_follows_table_order() {
        for year in -800..=2400 {
            let expected = if year % 400 == 0 {
                LeapReason::DivisibleBy400
            } else if year % 100 == 0 {
                LeapReason::DivisibleBy100NotLeap
            } else if year % 4 == 0 {
                LeapReason::DivisibleBy4
            } else {
                LeapReason::NotDivisible
            };
            assert_eq!(classify(year).reason, expected, "year {}", year);
        }
    }

    #[test]
    fn test_negative_years_use_plain_integer_arithmetic() {
        assert_eq!(classify(-400).reason, LeapReason::DivisibleBy400);
        assert_eq!(classify(-100).reason, LeapReason::DivisibleBy100NotLeap);
        assert_eq!(classify(-4).reason, LeapReason::DivisibleBy4);
        assert_eq!(classify(-1).reason, LeapReason::NotDivisible);
        assert!(is_leap(i64::MIN));
        assert!(!is_leap(i64::MAX));
    }

    #[test]
    fn test_classify_is_idempotent() {
        for year in [1600, 1700, 1996, 1997, 2000] {
            assert_eq!(classify(year), classify(year));
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(1975, 1900, 2050).unwrap(), 0.5);
        assert_eq!(normalize(1900, 1900, 2050).unwrap(), 0.0);
        assert_eq!(normalize(2050, 1900, 2050).unwrap(), 1.0);
        assert!(normalize(2200, 1900, 2050).unwrap() > 1.0);
        assert!(normalize(1800, 1900, 2050).unwrap() < 0.0);
    }

    #[test]
    fn test_normalize_degenerate_range_is_domain_error() {
        assert!(matches!(
            normalize(2000, 2000, 2000),
            Err(EtlError::DomainError {
                min_year: 2000,
                max_year: 2000
            })
        ));
        assert!(normalize(2000, 2050, 1900).is_err());
    }

    #[test]
    fn test_normalize_extreme_bounds_do_not_overflow() {
        assert_eq!(normalize(i64::MAX, i64::MIN, i64::MAX).unwrap(), 1.0);
        assert_eq!(normalize(i64::MIN, i64::MIN, i64::MAX).unwrap(), 0.0);
    }

    #[test]
    fn test_derive_records_is_dataset_relative() {
        let records = derive_records(&[2000, 2010, 2020]).unwrap();
        let normalized: Vec<f64> = records.iter().map(|r| r.normalized).collect();
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
        assert_eq!(records[0].reason, LeapReason::DivisibleBy400);
        assert_eq!(records[1].reason, LeapReason::NotDivisible);
        assert_eq!(records[2].leap_code(), 1);
    }

    #[test]
    fn test_derive_records_edge_inputs() {
        assert!(derive_records(&[]).unwrap().is_empty());
        assert!(matches!(
            derive_records(&[1984, 1984]),
            Err(EtlError::DomainError { .. })
        ));
    }
}
