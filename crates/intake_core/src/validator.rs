//! Client-side gate applied to every candidate file before any network call.
//!
//! Only the declared media type and the byte size are inspected; the content
//! is never sniffed.

use std::fmt;

use shared::protocol::{MAX_UPLOAD_BYTES, PDF_MIME_TYPE};

use crate::error::RejectReason;

/// A file presented by the user, before validation.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// Type is checked before size, so a non-PDF is always `UnsupportedType`.
pub fn validate(file: &CandidateFile) -> Result<(), RejectReason> {
    if file.media_type != PDF_MIME_TYPE {
        return Err(RejectReason::UnsupportedType {
            declared: file.media_type.clone(),
        });
    }

    let size_bytes = file.size_bytes();
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(RejectReason::TooLarge {
            size_bytes,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}
