//! Failure bodies of the intake endpoints.
//!
//! The server answers every rejected request with `{"code", "error"}`; the
//! client reads `error` back to describe why an upload or compute failed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// CSRF header missing or not matching the cookie.
    CsrfFailed,
    CalculatorNotFound,
    /// Multipart body carried no `pdf` part.
    MissingPdf,
    InvalidPdf,
    PdfTooLarge,
    /// Body could not be read as multipart or JSON.
    MalformedRequest,
}

impl ErrorCode {
    /// HTTP status the server answers with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::CsrfFailed => 403,
            Self::CalculatorNotFound => 404,
            Self::MissingPdf | Self::InvalidPdf | Self::MalformedRequest => 400,
            Self::PdfTooLarge => 413,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Self::CsrfFailed => "CSRF verification failed",
            Self::CalculatorNotFound => "Calculator not found",
            Self::MissingPdf => "pdf field is required",
            Self::InvalidPdf => "Invalid PDF file",
            Self::PdfTooLarge => "PDF file is too large",
            Self::MalformedRequest => "Malformed request body",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(rename = "error")]
    pub message: String,
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }
}

/// Raised by server-side intake operations; converts into the wire body.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct IntakeRejection {
    pub code: ErrorCode,
    pub message: String,
}

impl IntakeRejection {
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ErrorCode> for IntakeRejection {
    fn from(code: ErrorCode) -> Self {
        Self::with_message(code, code.default_message())
    }
}

impl From<IntakeRejection> for ApiError {
    fn from(value: IntakeRejection) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}
