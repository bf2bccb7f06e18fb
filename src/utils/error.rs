use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestkitError {
    #[error("Failed to read DICOM file {path}: {source}")]
    DicomReadError {
        path: PathBuf,
        #[source]
        source: dicom_object::ReadError,
    },

    #[error("Failed to write DICOM file {path}: {source}")]
    DicomWriteError {
        path: PathBuf,
        #[source]
        source: dicom_object::WriteError,
    },

    #[error("Invalid pixel attribute {attribute}: {reason}")]
    PixelAttributeError { attribute: String, reason: String },

    #[error("Unsupported pixel encoding: {reason}")]
    UnsupportedPixelEncoding { reason: String },

    #[error("Image buffer error: {message}")]
    ImageBufferError { message: String },

    #[error("Failed to save preview {path}: {source}")]
    PreviewError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Directory {path} does not exist")]
    DirectoryNotFound { path: PathBuf },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Authentication failed with HTTP status {status}")]
    AuthenticationError { status: u16 },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

/// 錯誤分類，供 CLI 決定提示內容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Authentication,
    Imaging,
    FileSystem,
    Data,
}

/// 錯誤嚴重程度，對應 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl TestkitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TestkitError::DicomReadError { .. }
            | TestkitError::DicomWriteError { .. }
            | TestkitError::PixelAttributeError { .. }
            | TestkitError::UnsupportedPixelEncoding { .. }
            | TestkitError::ImageBufferError { .. }
            | TestkitError::PreviewError { .. } => ErrorCategory::Imaging,
            TestkitError::DirectoryNotFound { .. } | TestkitError::IoError(_) => {
                ErrorCategory::FileSystem
            }
            TestkitError::ApiError(_) | TestkitError::UnexpectedStatus { .. } => {
                ErrorCategory::Network
            }
            TestkitError::AuthenticationError { .. } => ErrorCategory::Authentication,
            TestkitError::CsvError(_) | TestkitError::SerializationError(_) => ErrorCategory::Data,
            TestkitError::ConfigError { .. }
            | TestkitError::MissingConfigError { .. }
            | TestkitError::InvalidConfigValueError { .. }
            | TestkitError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可以重試
            TestkitError::ApiError(_) | TestkitError::UnexpectedStatus { .. } => {
                ErrorSeverity::Medium
            }
            TestkitError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TestkitError::DicomReadError { .. } => {
                "Check that the file is a DICOM Part 10 file with a 128-byte preamble".to_string()
            }
            TestkitError::DicomWriteError { path, .. } => {
                format!("Check write permissions for {}", path.display())
            }
            TestkitError::PixelAttributeError { attribute, .. } => {
                format!("Inspect the {} attribute of the file's image pixel module", attribute)
            }
            TestkitError::UnsupportedPixelEncoding { .. } => {
                "Decompress the file to a native transfer syntax before burning text".to_string()
            }
            TestkitError::ImageBufferError { .. } | TestkitError::PreviewError { .. } => {
                "Retry without --preview-dir or report the file for investigation".to_string()
            }
            TestkitError::DirectoryNotFound { .. } => {
                "Pass an existing directory as the first argument".to_string()
            }
            TestkitError::ApiError(_) | TestkitError::UnexpectedStatus { .. } => {
                "Check that the archive server is reachable and retry".to_string()
            }
            TestkitError::AuthenticationError { .. } => {
                "Verify the archive username and password".to_string()
            }
            TestkitError::CsvError(_) | TestkitError::SerializationError(_) => {
                "Check the export path and the server payload format".to_string()
            }
            TestkitError::IoError(_) => "Check file permissions and free disk space".to_string(),
            TestkitError::ConfigError { .. }
            | TestkitError::MissingConfigError { .. }
            | TestkitError::InvalidConfigValueError { .. }
            | TestkitError::ConfigValidationError { .. } => {
                "Review the command line arguments and the TOML configuration file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not talk to the archive: {}", self),
            ErrorCategory::Authentication => format!("Login rejected: {}", self),
            ErrorCategory::Imaging => format!("Image processing failed: {}", self),
            ErrorCategory::FileSystem => format!("File system problem: {}", self),
            ErrorCategory::Data => format!("Could not process data: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, TestkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let auth = TestkitError::AuthenticationError { status: 401 };
        assert_eq!(auth.category(), ErrorCategory::Authentication);
        assert_eq!(auth.severity().exit_code(), 1);

        let status = TestkitError::UnexpectedStatus {
            status: 503,
            url: "http://localhost/data".to_string(),
        };
        assert_eq!(status.severity(), ErrorSeverity::Medium);
        assert_eq!(status.severity().exit_code(), 2);

        let io = TestkitError::IoError(std::io::Error::other("disk full"));
        assert_eq!(io.severity().exit_code(), 3);
    }

    #[test]
    fn test_user_friendly_message_mentions_cause() {
        let err = TestkitError::DirectoryNotFound {
            path: PathBuf::from("/nope"),
        };
        assert!(err.user_friendly_message().contains("/nope"));
        assert!(err.recovery_suggestion().contains("existing directory"));
    }
}
