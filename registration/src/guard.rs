use crate::claims::{self, Claims, ClaimsError, Decoded};

/// Audience a token must be issued for to unlock the registration form.
pub const REGISTRATION_AUDIENCE: &str = "reg";

/// Text rendered in place of the form when access is denied.
pub const NO_TOKEN_PLACEHOLDER: &str = "No register token found";

#[derive(Debug)]
pub enum Denial {
    NoToken,
    Malformed(ClaimsError),
    WrongAudience(Option<String>),
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NoToken => write!(f, "no registration token"),
            Self::Malformed(e) => write!(f, "malformed registration token: {}", e),
            Self::WrongAudience(Some(aud)) => write!(f, "token audience '{}' is not allowed", aud),
            Self::WrongAudience(None) => write!(f, "token has no audience"),
        }
    }
}

#[derive(Debug)]
pub enum Access {
    Granted(Claims),
    Denied(Denial),
}

/// Decide whether the registration form may be shown for this token.
pub fn evaluate(token: Option<&str>) -> Access {
    let claims = match claims::decode(token) {
        Ok(Decoded::NoToken) => return Access::Denied(Denial::NoToken),
        Ok(Decoded::Present(claims)) => claims,
        Err(e) => return Access::Denied(Denial::Malformed(e)),
    };

    if claims.aud.as_deref() != Some(REGISTRATION_AUDIENCE) {
        return Access::Denied(Denial::WrongAudience(claims.aud));
    }

    Access::Granted(claims)
}
