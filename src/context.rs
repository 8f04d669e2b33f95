//! Per-request state passed down the chain.
//!
//! A [`Context`] is created when a request arrives, moved through every
//! middleware and the terminal handler, and consumed by the finalizer. It is
//! owned by exactly one request; nothing in it is shared with other requests.

use http::{Extensions, StatusCode};
use serde::Serialize;
use tracing::{Span, error, info_span, warn};

use crate::catalog;
use crate::outcome::Outcome;
use crate::request::Request;
use crate::structured::StructuredError;

pub struct Context {
    request: Request,
    outcome: Outcome,
    extensions: Extensions,
    span: Span,
}

impl Context {
    /// Starts a request lifecycle: empty outcome, empty extensions and a
    /// `request` span carrying the method and path.
    pub fn new(request: Request) -> Self {
        let span = info_span!("request", method = %request.method(), path = %request.path());
        Self { request, outcome: Outcome::new(), extensions: Extensions::new(), span }
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn outcome(&self) -> &Outcome { &self.outcome }
    pub fn outcome_mut(&mut self) -> &mut Outcome { &mut self.outcome }

    /// The request-scoped logging handle.
    pub fn span(&self) -> &Span { &self.span }

    /// Stores a value for later links in the chain, keyed by its type.
    /// Returns the value it replaced.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Like [`get`](Self::get), but yields `T::default()` when nothing was
    /// stored. Use `get` when absence must be told apart from the default.
    pub fn get_or_default<T: Clone + Default + Send + Sync + 'static>(&self) -> T {
        self.extensions.get::<T>().cloned().unwrap_or_default()
    }

    /// Records a successful result. Nothing is written until the chain returns.
    ///
    /// Pass `None::<T>` (or `()`) for an empty body. A payload that cannot be
    /// represented as JSON is replaced by [`catalog::INTERNAL_SERVICE`].
    ///
    /// The status is last-write-wins. Called after [`report_error`](Self::report_error),
    /// the error stays the body but goes out with `status`; report the error
    /// last when its own status must be on the wire.
    pub fn respond<T: Serialize>(&mut self, status: StatusCode, payload: T) {
        self.outcome.set_status(status);
        if let Err(e) = self.outcome.set_payload(payload) {
            self.span.in_scope(|| warn!("payload is not serializable: {e}"));
            self.outcome.clear_payload();
            self.report_error(&catalog::INTERNAL_SERVICE);
        }
    }

    /// Logs `err` on the request span and records it as the response.
    ///
    /// The error takes precedence over any payload, whatever order the two
    /// were recorded in. Callable from any middleware; the wire is untouched.
    pub fn report_error(&mut self, err: &StructuredError) {
        {
            let _entered = self.span.enter();
            error!(code = err.code(), status = err.status().as_u16(), "{err}");
        }
        self.outcome.set_error(err);
    }

    pub(crate) fn into_outcome(self) -> Outcome {
        self.outcome
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<Request> for Context {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}

impl From<http::Request<bytes::Bytes>> for Context {
    fn from(request: http::Request<bytes::Bytes>) -> Self {
        Self::new(request.into())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use serde_json::json;

    use super::*;

    fn context() -> Context {
        http::Request::builder()
            .uri("/orders/7")
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct UserId(u64);

    #[test]
    fn extensions_set_get_and_default() {
        let mut ctx = context();
        assert_eq!(ctx.get::<UserId>(), None);
        assert_eq!(ctx.get_or_default::<UserId>(), UserId(0));

        assert_eq!(ctx.insert(UserId(1)), None);
        assert_eq!(ctx.insert(UserId(2)), Some(UserId(1)));
        assert_eq!(ctx.get::<UserId>(), Some(&UserId(2)));
        assert_eq!(ctx.get_or_default::<UserId>(), UserId(2));
    }

    #[test]
    fn respond_records_status_and_payload() {
        let mut ctx = context();
        ctx.respond(StatusCode::OK, json!({"id": 7}));
        assert_eq!(ctx.outcome().status(), Some(StatusCode::OK));
        assert_eq!(ctx.outcome().payload(), Some(&json!({"id": 7})));
    }

    #[test]
    fn respond_after_report_error_keeps_the_error_body_and_takes_the_status() {
        let mut ctx = context();
        ctx.report_error(&catalog::REQUIRED_DATA);
        ctx.respond(StatusCode::OK, json!({"id": 1}));

        assert_eq!(ctx.outcome().status(), Some(StatusCode::OK));
        assert_eq!(ctx.outcome().error(), Some(&catalog::REQUIRED_DATA.to_response()));

        ctx.report_error(&catalog::REQUIRED_DATA);
        assert_eq!(ctx.outcome().status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn unserializable_payload_becomes_internal_error() {
        use std::collections::HashMap;

        let mut ctx = context();
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON object keys");
        ctx.respond(StatusCode::OK, bad);

        assert_eq!(ctx.outcome().status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(ctx.outcome().error(), Some(&catalog::INTERNAL_SERVICE.to_response()));
        assert!(ctx.outcome().payload().is_none());
    }

    #[test]
    fn report_error_logs_on_the_request_span() {
        let buf = Capture::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut ctx = context();
            ctx.report_error(&catalog::REQUIRED_DATA.with_arg("ignored"));
        });

        let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("ERROR"), "{logs}");
        assert!(logs.contains("00002: Dados obrigatórios."), "{logs}");
        assert!(logs.contains("path=/orders/7"), "{logs}");
    }
}
