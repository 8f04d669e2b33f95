//! Incoming HTTP request type.

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request with its body fully buffered.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Bytes,
}

impl Request {
    pub(crate) fn new(parts: Parts, body: Bytes) -> Self {
        Self { parts, body }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req: Request = http::Request::builder()
            .method(Method::POST)
            .uri("/users?active=1")
            .header("Authorization", "Bearer abc")
            .body(Bytes::from_static(b"{}"))
            .unwrap()
            .into();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/users");
        assert_eq!(req.header("authorization"), Some("Bearer abc"));
        assert_eq!(req.header("x-missing"), None);
        assert_eq!(req.body(), b"{}");
    }
}
