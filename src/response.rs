//! The response writer and the finalizer that drives it.
//!
//! [`ResponseWriter`] is the transport seam: whatever carries bytes back to the
//! client implements it. [`Response`] is the buffered implementation used by
//! [`Chain::call`](crate::Chain::call) and the bundled server.
//!
//! Only the finalizer in this module ever touches a writer, and the chain
//! calls it once per request after the outermost middleware returned.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::outcome::Outcome;

// ── ResponseWriter ───────────────────────────────────────────────────────────

/// Header, status-line and body primitives of the underlying transport.
pub trait ResponseWriter {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
    fn write_status(&mut self, status: StatusCode);
    fn write_body(&mut self, body: Bytes);
}

// ── Response ─────────────────────────────────────────────────────────────────

/// A fully buffered response.
///
/// Defaults to `500 Internal Server Error` with no headers and no body.
#[derive(Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Converts into the `http` type hyper serves.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

impl ResponseWriter for Response {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn write_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write_body(&mut self, body: Bytes) {
        self.body = body;
    }
}

// ── Finalizer ────────────────────────────────────────────────────────────────

/// Writes `outcome` to `writer`: the content type, then exactly one status
/// line, then at most one body.
///
/// An error, when present, is the body and the payload is ignored. Without
/// an error the payload is serialized; an absent payload writes no body.
pub(crate) fn finalize<W: ResponseWriter + ?Sized>(outcome: Outcome, writer: &mut W) {
    writer.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    writer.write_status(outcome.status_or_default());

    if let Some(err) = outcome.error() {
        write_json(writer, err);
        return;
    }

    if let Some(payload) = outcome.payload() {
        write_json(writer, payload);
    }
}

fn write_json<W: ResponseWriter + ?Sized, T: Serialize + ?Sized>(writer: &mut W, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => writer.write_body(Bytes::from(bytes)),
        Err(e) => error!("failed to encode response body: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog;

    /// Records every primitive call in order.
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ResponseWriter for Recorder {
        fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
            self.0.push(format!("header {name}: {}", value.to_str().unwrap()));
        }

        fn write_status(&mut self, status: StatusCode) {
            self.0.push(format!("status {}", status.as_u16()));
        }

        fn write_body(&mut self, body: Bytes) {
            self.0.push(format!("body {}", String::from_utf8(body.to_vec()).unwrap()));
        }
    }

    fn written(outcome: Outcome) -> Vec<String> {
        let mut rec = Recorder::default();
        finalize(outcome, &mut rec);
        rec.0
    }

    #[test]
    fn empty_outcome_writes_500_without_body() {
        assert_eq!(
            written(Outcome::new()),
            ["header content-type: application/json", "status 500"]
        );
    }

    #[test]
    fn error_wins_over_payload() {
        let mut outcome = Outcome::new();
        outcome.set_payload(json!({"id": 7})).unwrap();
        outcome.set_error(&catalog::REQUIRED_DATA);
        outcome.set_status(StatusCode::BAD_REQUEST);

        assert_eq!(
            written(outcome),
            [
                "header content-type: application/json",
                "status 400",
                r#"body {"message":"00002: Dados obrigatórios.","code":"00002"}"#,
            ]
        );
    }

    #[test]
    fn payload_without_status_is_written_with_500() {
        let mut outcome = Outcome::new();
        outcome.set_payload(json!({"id": 7})).unwrap();

        assert_eq!(
            written(outcome),
            ["header content-type: application/json", "status 500", r#"body {"id":7}"#]
        );
    }

    #[test]
    fn null_payload_writes_no_body() {
        let mut outcome = Outcome::new();
        outcome.set_status(StatusCode::OK);
        outcome.set_payload(None::<String>).unwrap();

        assert_eq!(written(outcome), ["header content-type: application/json", "status 200"]);
    }

    #[test]
    fn buffered_response_converts_to_http() {
        let mut res = Response::new();
        let mut outcome = Outcome::new();
        outcome.set_status(StatusCode::CREATED);
        outcome.set_payload("ok").unwrap();
        finalize(outcome, &mut res);

        let res = res.into_inner();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    }
}
