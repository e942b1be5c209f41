pub mod claims;
pub mod config;
pub mod field;
pub mod form;
pub mod guard;
pub mod logger;
pub mod services;
pub mod session;
pub mod submission;

#[cfg(test)]
pub mod testutils;

pub use claims::{Claims, ClaimsError, Decoded, IdentityToken};
pub use field::{Field, FieldError, FieldErrors};
pub use form::{FormState, RegistrationDetails};
pub use guard::{Access, Denial};
pub use session::{Message, RegistrationSession, Screen, SessionSettings};
pub use submission::{Attempt, AttemptId, Phase, SaveIcon, SubmissionController};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
