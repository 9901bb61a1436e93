use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Degenerate year range: max_year ({max_year}) must be greater than min_year ({min_year})")]
    DomainError { min_year: i64, max_year: i64 },

    #[error("Invalid year '{input}': {reason}")]
    InvalidYearInput { input: String, reason: String },

    #[error("Missing column: {column}")]
    MissingColumnError { column: String },

    #[error("Chart rendering error: {message}")]
    ChartError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Domain,
    Input,
    Rendering,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingColumnError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::DomainError { .. } => ErrorCategory::Domain,
            EtlError::InvalidYearInput { .. } | EtlError::ValidationError { .. } => {
                ErrorCategory::Input
            }
            EtlError::ChartError { .. } => ErrorCategory::Rendering,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Domain | ErrorCategory::Rendering => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::DomainError { .. } => {
                "Use a dataset spanning at least two distinct years"
            }
            EtlError::InvalidYearInput { .. } => "Enter a whole number such as 2024",
            EtlError::MissingColumnError { .. } => {
                "Make sure the CSV file has a 'Year' column header"
            }
            EtlError::CsvError(_) => "Check that the input file is a well-formed CSV file",
            EtlError::IoError(_) | EtlError::ZipError(_) => {
                "Check that the input file exists and the output directory is writable"
            }
            EtlError::ChartError { .. } => "Check that the dataset contains at least one year",
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the configuration file or command line flags"
            }
            EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => "Inspect the input data and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::DomainError { min_year, max_year } => format!(
                "Cannot normalize years: the dataset range {}..{} needs at least two distinct years",
                min_year, max_year
            ),
            EtlError::InvalidYearInput { input, .. } => {
                format!("'{}' is not a valid year", input)
            }
            EtlError::MissingColumnError { column } => {
                format!("No '{}' column found in the dataset", column)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
