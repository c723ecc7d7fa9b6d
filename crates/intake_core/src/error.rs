use thiserror::Error;

/// Error kinds surfaced to the user through the notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedType,
    TooLarge,
    UploadFailed,
    ComputeFailed,
    NoSession,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedType => "UNSUPPORTED_TYPE",
            Self::TooLarge => "TOO_LARGE",
            Self::UploadFailed => "UPLOAD_FAILED",
            Self::ComputeFailed => "COMPUTE_FAILED",
            Self::NoSession => "NO_SESSION",
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::UnsupportedType => "Sadece PDF dosyaları yükleyebilirsiniz.",
            Self::TooLarge => "Dosya boyutu 10MB'dan küçük olmalıdır.",
            Self::UploadFailed => "Dosya yükleme başarısız oldu.",
            Self::ComputeFailed => "Hesaplama işlemi başarısız oldu.",
            Self::NoSession => "Lütfen önce PDF dosyası yükleyin.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("unsupported media type {declared:?}")]
    UnsupportedType { declared: String },
    #[error("file is {size_bytes} bytes, limit is {limit} bytes")]
    TooLarge { size_bytes: u64, limit: u64 },
}

impl RejectReason {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("rejected {file}: {reason}")]
    Rejected { file: String, reason: RejectReason },
    #[error("upload of {file} failed: {cause}")]
    UploadFailed { file: String, cause: String },
    #[error("compute request failed: {0}")]
    ComputeFailed(String),
    #[error("no calculator session has been established")]
    NoSession,
}

impl IntakeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected { reason, .. } => reason.kind(),
            Self::UploadFailed { .. } => ErrorKind::UploadFailed,
            Self::ComputeFailed(_) => ErrorKind::ComputeFailed,
            Self::NoSession => ErrorKind::NoSession,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}
