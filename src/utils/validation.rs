use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Parses a year typed by a user. Surrounding whitespace and a leading `+`
/// are accepted; anything that is not a whole number is rejected here so the
/// classifier only ever sees integers.
pub fn parse_year_input(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EtlError::InvalidYearInput {
            input: input.to_string(),
            reason: "Year cannot be empty".to_string(),
        });
    }

    trimmed
        .parse::<i64>()
        .map_err(|e| EtlError::InvalidYearInput {
            input: input.to_string(),
            reason: format!("Not a whole number: {}", e),
        })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_year_span(field_name: &str, start: i64, end: i64) -> Result<()> {
    if end <= start {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}..={}", start, end),
            reason: "End year must be greater than start year".to_string(),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => {}
            Some(extension) => {
                return Err(EtlError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(EtlError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    let valid_formats = ["csv", "json", "svg"];
    for format in formats {
        if !valid_formats.contains(&format.as_str()) {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    valid_formats.join(", ")
                ),
            });
        }
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_input() {
        assert_eq!(parse_year_input("2024").unwrap(), 2024);
        assert_eq!(parse_year_input("  1900 ").unwrap(), 1900);
        assert_eq!(parse_year_input("-400").unwrap(), -400);
        assert_eq!(parse_year_input("+4").unwrap(), 4);
        assert!(parse_year_input("").is_err());
        assert!(parse_year_input("20.5").is_err());
        assert!(parse_year_input("year").is_err());
    }

    #[test]
    fn test_validate_year_span() {
        assert!(validate_year_span("dataset.sample", 1900, 2050).is_ok());
        assert!(validate_year_span("dataset.sample", 2000, 2000).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["leap_years.csv".to_string(), "UPPER.CSV".to_string()];
        assert!(validate_file_extensions("dataset.input", &files, &["csv"]).is_ok());

        let invalid_files = vec!["leap_years.xlsx".to_string()];
        assert!(validate_file_extensions("dataset.input", &invalid_files, &["csv"]).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["csv".to_string(), "svg".to_string()];
        assert!(validate_output_formats("load.output_formats", &formats).is_ok());
        let bad = vec!["png".to_string()];
        assert!(validate_output_formats("load.output_formats", &bad).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(3);
        assert_eq!(*validate_required_field("x", &present).unwrap(), 3);
        let absent: Option<i32> = None;
        assert!(validate_required_field("x", &absent).is_err());
    }
}
