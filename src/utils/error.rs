use crate::domain::model::Frequency;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Transport error for {url}: {message}")]
    TransportError { url: String, message: String },

    #[error("Decode error: {message}")]
    DecodeError { message: String },

    #[error("Malformed {frequency} period label: '{label}'")]
    MalformedPeriodLabel { label: String, frequency: Frequency },

    #[error("Malformed date: '{label}'")]
    MalformedDate { label: String },

    #[error("Duplicate entry for entity '{entity}', variable '{variable}', period {period}")]
    DuplicateKey {
        entity: String,
        variable: String,
        period: i32,
    },

    #[error("Unrecognised dataset: '{dataset}'")]
    UnknownDataset { dataset: String },

    #[error("Unrecognised frequency code: '{code}' (expected A, Q or M)")]
    UnknownFrequency { code: String },

    #[error("Column '{column}' not found in downloaded table")]
    MissingColumn { column: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::HttpError(_) | ScrapeError::TransportError { .. } => {
                ErrorCategory::Network
            }
            ScrapeError::ZipError(_)
            | ScrapeError::CsvError(_)
            | ScrapeError::DecodeError { .. }
            | ScrapeError::MalformedPeriodLabel { .. }
            | ScrapeError::MalformedDate { .. }
            | ScrapeError::DuplicateKey { .. }
            | ScrapeError::MissingColumn { .. } => ErrorCategory::Data,
            ScrapeError::UnknownDataset { .. }
            | ScrapeError::UnknownFrequency { .. }
            | ScrapeError::ConfigError { .. }
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScrapeError::IoError(_) | ScrapeError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScrapeError::HttpError(_) | ScrapeError::TransportError { .. } => {
                format!("Could not download data: {}", self)
            }
            ScrapeError::MalformedPeriodLabel { label, .. } => {
                format!("The downloaded table contains an unexpected period label '{}'", label)
            }
            ScrapeError::UnknownDataset { dataset } => {
                format!("'{}' is not a dataset this source knows about", dataset)
            }
            ScrapeError::UnknownFrequency { code } => {
                format!("'{}' is not a valid frequency", code)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScrapeError::HttpError(_) | ScrapeError::TransportError { .. } => {
                "Check your network connection and the source URL, then try again"
            }
            ScrapeError::MalformedPeriodLabel { .. } => {
                "Check that the requested frequency matches the series"
            }
            ScrapeError::MalformedDate { .. } => "Check the date range and series codes requested",
            ScrapeError::DuplicateKey { .. } => {
                "Set [panel] duplicate_policy = \"keep_last\" to accept the last value"
            }
            ScrapeError::UnknownDataset { .. } => "Use one of the supported datasets: weo, pubfin",
            ScrapeError::UnknownFrequency { .. } => "Use A (annual), Q (quarterly) or M (monthly)",
            ScrapeError::MissingColumn { .. } => "Check the series codes requested",
            ScrapeError::ZipError(_)
            | ScrapeError::CsvError(_)
            | ScrapeError::DecodeError { .. } => {
                "The source may have changed its file layout; inspect the downloaded file"
            }
            ScrapeError::ConfigError { .. }
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => "Review the configuration file and flags",
            ScrapeError::IoError(_) | ScrapeError::SerializationError(_) => {
                "Check file permissions and available disk space"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = ScrapeError::TransportError {
            url: "http://example.com".to_string(),
            message: "timed out".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = ScrapeError::UnknownDataset {
            dataset: "foo".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_malformed_label_message() {
        let err = ScrapeError::MalformedPeriodLabel {
            label: "2002 XYZ".to_string(),
            frequency: Frequency::Monthly,
        };
        assert_eq!(err.to_string(), "Malformed monthly period label: '2002 XYZ'");
        assert!(err.user_friendly_message().contains("2002 XYZ"));
    }
}
