use thiserror::Error;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Unable to parse line as JSON: {source}")]
    MalformedInput {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },

    #[error("Invalid schema for stream '{stream}': {message}")]
    InvalidSchema { stream: String, message: String },

    #[error("Record for stream '{stream}' failed validation: {message}")]
    ValidationError { stream: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Protocol,
    Validation,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 資料本身的問題，修正上游後重跑即可
    Medium,
    High,
    Critical,
}

impl TargetError {
    pub fn protocol(message: impl Into<String>) -> Self {
        TargetError::ProtocolError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TargetError::MalformedInput { .. } | TargetError::SerializationError(_) => {
                ErrorCategory::Input
            }
            TargetError::ProtocolError { .. } | TargetError::InvalidSchema { .. } => {
                ErrorCategory::Protocol
            }
            TargetError::ValidationError { .. } => ErrorCategory::Validation,
            TargetError::CsvError(_) | TargetError::IoError(_) => ErrorCategory::Io,
            TargetError::ConfigError { .. }
            | TargetError::InvalidConfigValueError { .. }
            | TargetError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Protocol | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            TargetError::MalformedInput { line, .. } => {
                format!("Input line is not valid JSON: {}", line)
            }
            TargetError::ProtocolError { message } => format!("Invalid message: {}", message),
            TargetError::InvalidSchema { stream, .. } => {
                format!("The schema for stream '{}' could not be compiled", stream)
            }
            TargetError::ValidationError { stream, message } => {
                format!("A record for stream '{}' is invalid: {}", stream, message)
            }
            TargetError::CsvError(e) => format!("Failed to read or write CSV: {}", e),
            TargetError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check that every input line is a single JSON object",
            ErrorCategory::Protocol => {
                "Make sure the tap emits a SCHEMA message before any RECORD of the same stream"
            }
            ErrorCategory::Validation => {
                "Fix the upstream record or relax the stream's JSON schema"
            }
            ErrorCategory::Io => "Check file permissions and free disk space for the output path",
            ErrorCategory::Configuration => "Review the config file and command line options",
        }
    }
}

pub type Result<T> = std::result::Result<T, TargetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_severity() {
        let err = TargetError::protocol("Unknown message type FOO");
        assert_eq!(err.category(), ErrorCategory::Protocol);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = TargetError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let err = TargetError::ValidationError {
            stream: "users".to_string(),
            message: "\"x\" is not of type \"integer\"".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_malformed_input_keeps_line() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = TargetError::MalformedInput {
            line: "{oops".to_string(),
            source,
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.user_friendly_message().contains("{oops"));
    }
}
