use std::fmt;

/// A field a new report cannot be filed without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Location,
    ReporterName,
    ReporterContact,
}

impl RequiredField {
    pub fn name(&self) -> &'static str {
        match self {
            RequiredField::Location => "location",
            RequiredField::ReporterName => "reporterName",
            RequiredField::ReporterContact => "reporterContact",
        }
    }
}

/// Errors produced by report operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A required field was missing or blank.
    Validation { field: RequiredField },
    /// No report has this id.
    NotFound { id: String },
    /// The document store or blob storage failed.
    Storage(String),
    /// An uploaded image exceeded the configured size limit.
    UploadTooLarge { limit_bytes: u64 },
    /// The request body could not be decoded.
    InvalidBody(String),
}

impl ReportError {
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::Validation { .. } | ReportError::InvalidBody(_) => 400,
            ReportError::NotFound { .. } => 404,
            ReportError::UploadTooLarge { .. } => 413,
            ReportError::Storage(_) => 500,
        }
    }

    /// Message safe to return to the caller. Storage details stay in the
    /// log; the caller sees `fallback` instead.
    pub fn public_message(&self, fallback: &str) -> String {
        match self {
            ReportError::Storage(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Validation { field } => match field {
                RequiredField::Location => write!(f, "Location is required"),
                RequiredField::ReporterName => write!(f, "Reporter name is required"),
                RequiredField::ReporterContact => {
                    write!(f, "Reporter contact (phone or email) is required")
                }
            },
            ReportError::NotFound { .. } => write!(f, "Report not found"),
            ReportError::Storage(detail) => write!(f, "storage failure: {detail}"),
            ReportError::UploadTooLarge { limit_bytes } => {
                write!(f, "Image exceeds max size of {limit_bytes} bytes")
            }
            ReportError::InvalidBody(detail) => write!(f, "Invalid request body: {detail}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<worker::Error> for ReportError {
    fn from(err: worker::Error) -> Self {
        ReportError::Storage(err.to_string())
    }
}
