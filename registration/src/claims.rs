//! Decoding of the registration token claims.
//!
//! The token is a compact `header.payload.signature` string handed over by the identity
//! provider. Only the payload is read here: integrity of the token is established by whoever
//! issued the cookie, so no signature or expiry check is performed.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Serialize};

const PAD_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PAD_INDIFFERENT);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PAD_INDIFFERENT);

/// Claims carried by the payload segment of a registration token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Full display name, first and last name separated by spaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Audience, the form is only usable with [`crate::guard::REGISTRATION_AUDIENCE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Identity provider tag, forwarded to the login page after registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prov: Option<String>,
    /// Any other claim. Kept as is and never interpreted.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug)]
pub enum ClaimsError {
    MissingPayload,
    Base64(base64::DecodeError),
    Json(serde_json::Error),
}

impl std::fmt::Display for ClaimsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::MissingPayload => write!(f, "token has no payload segment"),
            Self::Base64(e) => write!(f, "token payload is not base64: {}", e),
            Self::Json(e) => write!(f, "token payload is not a claims object: {}", e),
        }
    }
}

impl std::error::Error for ClaimsError {}

impl From<base64::DecodeError> for ClaimsError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Base64(e)
    }
}

impl From<serde_json::Error> for ClaimsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// The raw compact token as read from the cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Second dot-separated segment of the token, if any.
    pub fn payload_segment(&self) -> Option<&str> {
        self.0.split('.').nth(1).filter(|s| !s.is_empty())
    }

    pub fn claims(&self) -> Result<Claims, ClaimsError> {
        let segment = self.payload_segment().ok_or(ClaimsError::MissingPayload)?;
        let engine = if segment.contains(['-', '_']) {
            &URL_SAFE
        } else {
            &STANDARD
        };
        let payload = engine.decode(segment)?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

/// Outcome of reading the token source.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// No token was present. Distinct from a token with no claims.
    NoToken,
    Present(Claims),
}

impl Decoded {
    /// The decoded claims, an empty record if no token was present.
    pub fn claims(&self) -> Claims {
        match self {
            Self::NoToken => Claims::default(),
            Self::Present(claims) => claims.clone(),
        }
    }

    pub fn is_no_token(&self) -> bool {
        matches!(self, Self::NoToken)
    }
}

pub fn decode(token: Option<&str>) -> Result<Decoded, ClaimsError> {
    match token {
        None => Ok(Decoded::NoToken),
        Some(raw) => IdentityToken::new(raw).claims().map(Decoded::Present),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::token;
    use base64::engine::general_purpose;
    use serde_json::json;

    #[test]
    fn absent_token() {
        let decoded = decode(None).unwrap();
        assert!(decoded.is_no_token());
        assert_eq!(decoded.claims(), Claims::default());
    }

    #[test]
    fn recognized_and_opaque_claims() {
        let raw = token(json!({
            "name": "Jane Q Public",
            "aud": "reg",
            "email": "jane@example.com",
            "prov": "google",
            "exp": 1700000000,
            "sub": "abc"
        }));
        let claims = decode(Some(&raw)).unwrap().claims();
        assert_eq!(claims.name.as_deref(), Some("Jane Q Public"));
        assert_eq!(claims.aud.as_deref(), Some("reg"));
        assert_eq!(claims.email.as_deref(), Some("jane@example.com"));
        assert_eq!(claims.prov.as_deref(), Some("google"));
        assert_eq!(claims.extra.get("exp"), Some(&json!(1700000000)));
        assert_eq!(claims.extra.get("sub"), Some(&json!("abc")));
        assert_eq!(claims.extra.len(), 2);
    }

    #[test]
    fn both_alphabets_and_padding() {
        // "?>?" encodes to characters that differ between the two alphabets.
        let payload = br#"{"aud":"reg","name":"?>?"}"#;
        for encoded in [
            general_purpose::STANDARD.encode(payload),
            general_purpose::STANDARD_NO_PAD.encode(payload),
            general_purpose::URL_SAFE.encode(payload),
            general_purpose::URL_SAFE_NO_PAD.encode(payload),
        ] {
            let raw = format!("e30.{}.sig", encoded);
            let claims = decode(Some(&raw)).unwrap().claims();
            assert_eq!(claims.aud.as_deref(), Some("reg"), "{}", encoded);
            assert_eq!(claims.name.as_deref(), Some("?>?"), "{}", encoded);
        }
    }

    #[test]
    fn signature_is_not_checked() {
        let raw = token(json!({"aud": "reg"}));
        let (head, _) = raw.rsplit_once('.').unwrap();
        let tampered = format!("{}.not-a-signature", head);
        assert!(decode(Some(&tampered)).is_ok());
        // A token without a signature segment is read the same way.
        assert!(decode(Some(head)).is_ok());
    }

    #[test]
    fn malformed_tokens() {
        assert!(matches!(
            decode(Some("")),
            Err(ClaimsError::MissingPayload)
        ));
        assert!(matches!(
            decode(Some("onlyonesegment")),
            Err(ClaimsError::MissingPayload)
        ));
        assert!(matches!(
            decode(Some("a..c")),
            Err(ClaimsError::MissingPayload)
        ));
        assert!(matches!(
            decode(Some("a.!!!!.c")),
            Err(ClaimsError::Base64(_))
        ));
        let not_json = general_purpose::URL_SAFE_NO_PAD.encode("not json");
        assert!(matches!(
            decode(Some(&format!("a.{}.c", not_json))),
            Err(ClaimsError::Json(_))
        ));
        // Recognized keys must hold strings.
        let raw = token(json!({"aud": ["reg"]}));
        assert!(matches!(decode(Some(&raw)), Err(ClaimsError::Json(_))));
    }
}
