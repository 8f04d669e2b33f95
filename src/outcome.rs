//! What a request produced, waiting to be written.
//!
//! Handlers and middleware record their result here instead of writing to the
//! wire. The finalizer reads it exactly once, after the whole chain returned.

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::structured::{ErrorResponse, StructuredError};

/// The typed result of one request.
///
/// - `status` — absent means the finalizer answers `500 Internal Server Error`.
/// - `error` — when set, it is the whole body; `payload` is ignored.
/// - `payload` — written only without an error. Values that serialize to
///   JSON `null` are stored as absent, so the body is empty rather than `null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    status: Option<StatusCode>,
    error: Option<ErrorResponse>,
    payload: Option<Value>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> { self.status }
    pub fn error(&self) -> Option<&ErrorResponse> { self.error.as_ref() }
    pub fn payload(&self) -> Option<&Value> { self.payload.as_ref() }

    /// The status to put on the wire: the recorded one, or 500.
    pub fn status_or_default(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Last write wins.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Records a raw numeric status. Codes outside `100..=999` are ignored,
    /// which leaves the previous status (or the 500 default) in place.
    pub fn set_status_code(&mut self, code: u16) -> bool {
        match StatusCode::from_u16(code) {
            Ok(status) => {
                self.status = Some(status);
                true
            }
            Err(_) => false,
        }
    }

    /// Records `err` as the response: its status and its wire body.
    pub fn set_error(&mut self, err: &StructuredError) {
        self.status = Some(err.status());
        self.error = Some(err.to_response());
    }

    /// Serializes `payload` now so the finalizer never has to fail.
    pub fn set_payload<T: Serialize>(&mut self, payload: T) -> Result<(), serde_json::Error> {
        self.payload = match serde_json::to_value(payload)? {
            Value::Null => None,
            value => Some(value),
        };
        Ok(())
    }

    pub fn clear_payload(&mut self) {
        self.payload = None;
    }
}
