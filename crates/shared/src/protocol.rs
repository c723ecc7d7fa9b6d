use serde::{Deserialize, Serialize};

use crate::domain::CalculatorId;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const UPLOAD_FIELD_PDF: &str = "pdf";
pub const UPLOAD_FIELD_CALCULATOR_ID: &str = "calculator_id";

pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

pub const UPLOAD_PDF_PATH: &str = "upload-pdf/";
pub const COMPUTE_RESULTS_PATH: &str = "/calculator/results/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPdfResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculator_id: Option<CalculatorId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub calculator_id: CalculatorId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_tolerates_missing_calculator_id() {
        let parsed: UploadPdfResponse =
            serde_json::from_str(r#"{"message":"PDF uploaded successfully"}"#).expect("parse");
        assert!(parsed.calculator_id.is_none());
    }

    #[test]
    fn upload_response_reads_integer_calculator_id() {
        let parsed: UploadPdfResponse =
            serde_json::from_str(r#"{"message":"ok","calculator_id":7}"#).expect("parse");
        assert_eq!(parsed.calculator_id, Some(CalculatorId::new("7")));
    }

    #[test]
    fn compute_request_matches_wire_shape() {
        let body = serde_json::to_value(ComputeRequest {
            calculator_id: CalculatorId::new("abc123"),
        })
        .expect("encode");
        assert_eq!(body, serde_json::json!({ "calculator_id": "abc123" }));
    }
}
