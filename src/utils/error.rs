use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Invalid mesh '{label}': {reason}")]
    InvalidMesh { label: String, reason: String },

    #[error("Invalid field '{label}': {reason}")]
    InvalidField { label: String, reason: String },

    #[error("Field '{label}' does not match: expected {expected}, got {actual}")]
    FieldMismatch {
        label: String,
        expected: String,
        actual: String,
    },

    #[error("Field '{name}' not found")]
    FieldNotFound { name: String },

    #[error("Field '{name}' already exists")]
    DuplicateField { name: String },

    #[error("Request for unknown vertex field '{name}' for '{source_label}'")]
    UnknownField { name: String, source_label: String },

    #[error("{component} must be configured before use")]
    NotConfigured { component: String },

    #[error("{component} must be initialized before use")]
    NotInitialized { component: String },

    #[error("Unsupported cell with {num_vertices} vertices in {dimension}D mesh")]
    UnsupportedCell { dimension: usize, num_vertices: usize },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Lifecycle,
    Data,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OutputError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OutputError::IoError(_) | OutputError::CsvError(_) | OutputError::SerializationError(_) => {
                ErrorCategory::Io
            }
            OutputError::ConfigError { .. }
            | OutputError::ConfigValidationError { .. }
            | OutputError::InvalidConfigValueError { .. }
            | OutputError::MissingConfigError { .. } => ErrorCategory::Configuration,
            OutputError::NotConfigured { .. } | OutputError::NotInitialized { .. } => {
                ErrorCategory::Lifecycle
            }
            OutputError::InvalidMesh { .. }
            | OutputError::InvalidField { .. }
            | OutputError::FieldMismatch { .. }
            | OutputError::FieldNotFound { .. }
            | OutputError::DuplicateField { .. }
            | OutputError::UnknownField { .. }
            | OutputError::UnsupportedCell { .. }
            | OutputError::ProcessingError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Lifecycle => ErrorSeverity::Critical,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => match self {
                // 缺欄位通常是輸入資料的問題，重跑前修正即可
                OutputError::UnknownField { .. } | OutputError::FieldNotFound { .. } => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::High,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OutputError::IoError(_) => "Check that the input file exists and the output path is writable",
            OutputError::CsvError(_) => "Check the CSV writer settings and available disk space",
            OutputError::SerializationError(_) => "Check that the input document is valid JSON",
            OutputError::ConfigError { .. } | OutputError::ConfigValidationError { .. } => {
                "Fix the configuration file syntax and try again"
            }
            OutputError::InvalidConfigValueError { .. } => "Correct the configuration value and try again",
            OutputError::MissingConfigError { .. } => "Add the missing configuration entry",
            OutputError::InvalidMesh { .. } => "Check mesh dimensions, coordinates and cell connectivity",
            OutputError::InvalidField { .. } | OutputError::FieldMismatch { .. } => {
                "Check that field values match the mesh vertex count and fiber dimension"
            }
            OutputError::FieldNotFound { .. } | OutputError::UnknownField { .. } => {
                "Request only fields listed by the input source"
            }
            OutputError::DuplicateField { .. } => "Use a unique name for each field",
            OutputError::NotConfigured { .. } | OutputError::NotInitialized { .. } => {
                "Call configure() and initialize() before filtering or writing output"
            }
            OutputError::UnsupportedCell { .. } => "Use a writer that supports this cell shape (csv or json)",
            OutputError::ProcessingError { .. } => "Inspect the logs with --verbose for details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Lifecycle => format!("Internal ordering problem: {}", self),
            ErrorCategory::Data => format!("Input data problem: {}", self),
            ErrorCategory::Io => format!("File problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_severity() {
        let err = OutputError::NotInitialized {
            component: "vertex filter".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Lifecycle);
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let err = OutputError::UnknownField {
            name: "bogus".to_string(),
            source_label: "fault".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = OutputError::MissingConfigError {
            field: "output.basename".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_user_friendly_message_contains_cause() {
        let err = OutputError::FieldNotFound {
            name: "area".to_string(),
        };
        let message = err.user_friendly_message();
        assert!(message.starts_with("Input data problem"));
        assert!(message.contains("area"));
    }
}
