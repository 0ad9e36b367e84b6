//! # Grid Errors
//!
//! Domain errors raised by the grid models and the API service.
//! Application plumbing wraps these in `anyhow::Error`.

use thiserror::Error;

/// Patient identifiers as assigned by the server
pub type PatientId = i64;

#[derive(Debug, Error)]
pub enum GridError {
    /// The only fatal condition of the grid: a row lookup by patient id failed
    #[error("no row found for patient {0}")]
    PatientNotFound(PatientId),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{method} {url} returned HTTP {status}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An update or delete reached the queue for an item whose create failed
    #[error("item has no server id; its create did not succeed")]
    UnsavedItem,
}

impl GridError {
    /// True for the failures that must end the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, GridError::PatientNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_not_found_should_be_fatal_and_descriptive() {
        let error = GridError::PatientNotFound(42);
        assert!(error.is_fatal());
        assert_eq!(error.to_string(), "no row found for patient 42");
    }

    #[test]
    fn http_status_should_not_be_fatal() {
        let error = GridError::HttpStatus {
            method: "PUT".to_string(),
            url: "http://localhost/patient/1/location/".to_string(),
            status: 500,
        };
        assert!(!error.is_fatal());
        assert_eq!(
            error.to_string(),
            "PUT http://localhost/patient/1/location/ returned HTTP 500"
        );
    }
}
