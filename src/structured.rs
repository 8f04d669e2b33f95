//! Coded, client-facing errors.
//!
//! A [`StructuredError`] is a plain value: a stable code, a message template,
//! positional arguments and a fixed HTTP status. The shared catalog entries in
//! [`catalog`](crate::catalog) are constants, so attaching request-specific
//! arguments always produces a fresh copy:
//!
//! ```rust
//! use finale::catalog;
//!
//! let err = catalog::REQUIRED_DATA.with_arg("email");
//! assert_eq!(err.code(), "00002");
//! assert_eq!(catalog::REQUIRED_DATA.args().len(), 0);
//! ```

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

const PLACEHOLDER: &str = "{}";

// ── StructuredError ──────────────────────────────────────────────────────────

/// A coded error with a lazily formatted message and a fixed HTTP status.
///
/// Rendering never mutates the value; calling [`render`](Self::render) any
/// number of times yields the same text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuredError {
    code: &'static str,
    template: &'static str,
    args: Vec<String>,
    status: StatusCode,
}

impl StructuredError {
    /// Defines a new error kind. `template` may contain `{}` placeholders,
    /// filled in order from the arguments attached with [`with_arg`](Self::with_arg).
    pub const fn new(code: &'static str, template: &'static str, status: StatusCode) -> Self {
        Self { code, template, args: Vec::new(), status }
    }

    /// Returns a copy of this error with one more positional argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn code(&self) -> &'static str { self.code }
    pub fn template(&self) -> &'static str { self.template }
    pub fn args(&self) -> &[String] { &self.args }

    /// The HTTP status this error kind is answered with.
    pub fn status(&self) -> StatusCode { self.status }

    /// The message with its arguments substituted.
    ///
    /// Falls back to the raw template when the number of placeholders and
    /// arguments disagree.
    pub fn message(&self) -> String {
        if self.args.is_empty() || self.template.matches(PLACEHOLDER).count() != self.args.len() {
            return self.template.to_owned();
        }

        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;
        for arg in &self.args {
            // Arity was checked above, so every argument has a placeholder.
            let Some(at) = rest.find(PLACEHOLDER) else { break };
            out.push_str(&rest[..at]);
            out.push_str(arg);
            rest = &rest[at + PLACEHOLDER.len()..];
        }
        out.push_str(rest);
        out
    }

    /// `"<code>: <message>."`
    pub fn render(&self) -> String {
        format!("{}: {}.", self.code, self.message())
    }

    /// The body sent to clients. The status travels on the status line.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse { message: self.render(), code: self.code.to_owned() }
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for StructuredError {}

// ── Wire shape ───────────────────────────────────────────────────────────────

/// Wire shape of an error body: `{"message": "...", "code": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

impl From<&StructuredError> for ErrorResponse {
    fn from(err: &StructuredError) -> Self {
        err.to_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOT_FOUND: StructuredError =
        StructuredError::new("10000", "Recurso {} não encontrado em {}", StatusCode::NOT_FOUND);

    #[test]
    fn render_without_args_uses_template() {
        let err = StructuredError::new("10001", "Falha geral", StatusCode::BAD_GATEWAY);
        assert_eq!(err.render(), "10001: Falha geral.");
        assert_eq!(err.to_string(), err.render());
    }

    #[test]
    fn render_substitutes_positional_args() {
        let err = NOT_FOUND.with_arg("user").with_arg(42);
        assert_eq!(err.render(), "10000: Recurso user não encontrado em 42.");
    }

    #[test]
    fn arity_mismatch_falls_back_to_template() {
        let err = NOT_FOUND.with_arg("user");
        assert_eq!(err.message(), "Recurso {} não encontrado em {}");

        let err = NOT_FOUND.with_arg(1).with_arg(2).with_arg(3);
        assert_eq!(err.message(), "Recurso {} não encontrado em {}");
    }

    #[test]
    fn rendering_is_repeatable() {
        let err = NOT_FOUND.with_arg("a").with_arg("b");
        assert_eq!(err.render(), err.render());
        assert_eq!(err.to_response(), err.to_response());
    }

    #[test]
    fn deriving_leaves_the_constant_untouched() {
        let _derived = NOT_FOUND.with_arg("x").with_arg("y");
        assert!(NOT_FOUND.args().is_empty());
        assert_eq!(NOT_FOUND.message(), "Recurso {} não encontrado em {}");
    }

    #[test]
    fn response_body_excludes_status() {
        let body = serde_json::to_string(&NOT_FOUND.to_response()).unwrap();
        assert_eq!(
            body,
            r#"{"message":"10000: Recurso {} não encontrado em {}.","code":"10000"}"#
        );
    }
}
