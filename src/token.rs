//! Authentication token claims shared between services.
//!
//! [`JwtToken`] is the decoded claim set an authentication middleware stores
//! on the [`Context`](crate::Context) for later links to read:
//!
//! ```rust
//! use finale::token::{JwtToken, StandardClaims};
//!
//! let token = JwtToken {
//!     claims: StandardClaims { subject: Some("user-42".into()), ..Default::default() },
//!     ..Default::default()
//! };
//! assert_eq!(
//!     serde_json::to_string(&token).unwrap(),
//!     r#"{"sub":"user-42"}"#,
//! );
//! ```
//!
//! Signing and verification are not done here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The registered claims of RFC 7519 §4.1. Absent claims are not serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardClaims {
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl StandardClaims {
    /// `true` once `now` (seconds since the epoch) reaches `exp`.
    /// A token without `exp` never expires.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Registered claims plus two free-form sections, flattened into one object:
/// `{"sub": "...", "exp": 0, "data": {...}, "extras": {...}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtToken {
    #[serde(flatten)]
    pub claims: StandardClaims,
    /// Application data carried by the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Value>,
}
