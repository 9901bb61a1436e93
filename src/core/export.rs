use crate::domain::model::{YearGroups, YearRecord};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Year")]
    year: i64,
    #[serde(rename = "Is_Leap_Year")]
    is_leap_year: bool,
    #[serde(rename = "Leap_Code")]
    leap_code: u8,
    #[serde(rename = "Leap_Reason")]
    leap_reason: &'static str,
    #[serde(rename = "Year_Normalized")]
    year_normalized: f64,
    #[serde(rename = "Year_Group")]
    year_group: &'a str,
}

/// Writes the augmented table: the input year plus every derived column.
pub fn records_to_csv(records: &[YearRecord], groups: &YearGroups) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(CsvRow {
            year: record.year,
            is_leap_year: record.is_leap,
            leap_code: record.leap_code(),
            leap_reason: record.reason.label(),
            year_normalized: record.normalized,
            year_group: groups.assign(record.year).unwrap_or(""),
        })?;
    }
    if records.is_empty() {
        writer.write_record([
            "Year",
            "Is_Leap_Year",
            "Leap_Code",
            "Leap_Reason",
            "Year_Normalized",
            "Year_Group",
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
