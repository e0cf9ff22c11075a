//! Caller-facing response body for one extraction request.

use serde::{Deserialize, Serialize};

use super::invoice::InvoiceRecord;
use crate::error::ExtractionError;

/// Response body: either the extracted record or an error message, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResponse {
    /// Extraction succeeded.
    Success {
        /// Upload identifier, when the file went through an upload store.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        /// Always `"success"`.
        status: String,
        /// The extracted record.
        extracted_data: InvoiceRecord,
    },
    /// Extraction failed.
    Error {
        /// Human-readable failure message.
        error: String,
    },
}

impl ExtractionResponse {
    /// Wrap the outcome of a `process_document` call.
    pub fn from_result(
        file_id: Option<String>,
        result: Result<InvoiceRecord, ExtractionError>,
    ) -> Self {
        match result {
            Ok(extracted_data) => Self::Success {
                file_id,
                status: "success".to_string(),
                extracted_data,
            },
            Err(e) => Self::error(e.message()),
        }
    }

    /// An error response with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Whether this response carries a record.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The extracted record, if any.
    pub fn record(&self) -> Option<&InvoiceRecord> {
        match self {
            Self::Success { extracted_data, .. } => Some(extracted_data),
            Self::Error { .. } => None,
        }
    }
}
