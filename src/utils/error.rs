use crate::core::ingest::IngestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Spreadsheet ingestion failed: {0}")]
    IngestError(#[from] IngestError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Backend rejected request (HTTP {status}): {message}")]
    BackendError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl TriageError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            TriageError::IngestError(e) => format!("Could not ingest the spreadsheet: {}", e),
            TriageError::ApiError(e) => format!("Could not reach the triage backend: {}", e),
            TriageError::BackendError { status, message } => {
                format!(
                    "The triage backend rejected the request ({}): {}",
                    status, message
                )
            }
            TriageError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            TriageError::MissingConfigError { field } => {
                format!("Missing configuration: {}", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TriageError::IngestError(IngestError::EmptyFile) => {
                "Add at least one data row below the header row and re-run"
            }
            TriageError::IngestError(IngestError::MissingColumns(_)) => {
                "Fix the spreadsheet headers to match the expected column names"
            }
            TriageError::IngestError(IngestError::Malformed(_)) => {
                "Re-export the file as .xlsx or .csv and try again"
            }
            TriageError::ApiError(_) => {
                "Check that the backend is running and --api-endpoint is correct"
            }
            TriageError::BackendError { status: 401, .. } => {
                "Check the API token (--token or TRIAGE_API_TOKEN)"
            }
            TriageError::BackendError { .. } => "Inspect the backend logs for details",
            TriageError::InvalidConfigValueError { .. }
            | TriageError::MissingConfigError { .. } => {
                "Run with --help to see the expected arguments"
            }
            _ => "Check file permissions and available disk space, then retry",
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
