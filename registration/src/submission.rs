//! State machine driving the registration mutation.
//!
//! A single attempt can be in flight at any given time. An attempt is identified by the session
//! it was started from and a sequence number, so that a response for anything else than the
//! current attempt is simply dropped.

use uuid::Uuid;

use crate::{
    field::{Field, FieldErrors},
    form::RegistrationDetails,
    services::graphql::{MutationError, RegisteredId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId {
    pub session: Uuid,
    pub seq: u64,
}

/// A submission to hand over to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub id: AttemptId,
    pub details: RegistrationDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success(RegisteredId),
    Failure {
        error: MutationError,
        fields: FieldErrors,
    },
}

/// Icon of the save control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIcon {
    Save,
    Busy,
}

#[derive(Debug, Clone)]
pub struct SubmissionController {
    session: Uuid,
    seq: u64,
    phase: Phase,
}

impl SubmissionController {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            seq: 0,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Whether the submit and save controls are enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Failure { .. })
    }

    pub fn save_icon(&self) -> SaveIcon {
        if self.is_loading() {
            SaveIcon::Busy
        } else {
            SaveIcon::Save
        }
    }

    /// Start a new attempt with the given snapshot. Errors of the previous attempt are
    /// dropped. Returns `None` if an attempt is in flight or the user is already registered.
    pub fn begin(&mut self, details: RegistrationDetails) -> Option<Attempt> {
        if !self.can_submit() {
            tracing::debug!("Submission ignored in phase {:?}", self.phase);
            return None;
        }
        self.seq += 1;
        self.phase = Phase::Loading;
        let id = AttemptId {
            session: self.session,
            seq: self.seq,
        };
        tracing::info!("Starting registration attempt {}", self.seq);
        Some(Attempt { id, details })
    }

    fn current_attempt(&self) -> Option<AttemptId> {
        self.is_loading().then_some(AttemptId {
            session: self.session,
            seq: self.seq,
        })
    }

    /// Apply the outcome of an attempt. Returns the id once the user is registered, which is
    /// the cue to leave the form.
    pub fn resolve(
        &mut self,
        id: AttemptId,
        outcome: Result<RegisteredId, MutationError>,
    ) -> Option<&RegisteredId> {
        if self.current_attempt() != Some(id) {
            tracing::debug!(
                "Ignoring outcome of attempt {} from session {}",
                id.seq,
                id.session
            );
            return None;
        }

        match outcome {
            Ok(registered) => {
                tracing::info!("Registered user {}", registered);
                self.phase = Phase::Success(registered);
                match &self.phase {
                    Phase::Success(registered) => Some(registered),
                    _ => None,
                }
            }
            Err(error) => {
                tracing::warn!("Registration attempt {} failed: {}", id.seq, error);
                let fields = FieldErrors::classify(error.messages());
                for message in fields.untagged() {
                    tracing::warn!("Registration error not bound to a field: {}", message);
                }
                self.phase = Phase::Failure { error, fields };
                None
            }
        }
    }

    /// Error to display under `field`. Nothing is displayed while an attempt is in flight.
    pub fn field_error(&self, field: Field) -> &str {
        match &self.phase {
            Phase::Failure { fields, .. } => fields.get(field),
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::details;

    fn failure(messages: &[&str]) -> Result<RegisteredId, MutationError> {
        Err(MutationError::GraphQl(
            messages.iter().map(|m| m.to_string()).collect(),
        ))
    }

    #[test]
    fn single_attempt_in_flight() {
        let mut controller = SubmissionController::new(Uuid::new_v4());
        assert_eq!(controller.phase(), &Phase::Idle);
        assert!(controller.can_submit());
        assert_eq!(controller.save_icon(), SaveIcon::Save);

        let attempt = controller.begin(details("Jane")).unwrap();
        assert_eq!(attempt.details, details("Jane"));
        assert!(controller.is_loading());
        assert!(!controller.can_submit());
        assert_eq!(controller.save_icon(), SaveIcon::Busy);

        // Neither the form submit nor the save control can start another one.
        assert_eq!(controller.begin(details("Jane")), None);
        assert_eq!(controller.begin(details("Other")), None);
        assert!(controller.is_loading());
    }

    #[test]
    fn failure_maps_field_errors() {
        let mut controller = SubmissionController::new(Uuid::new_v4());
        let attempt = controller.begin(details("J")).unwrap();
        assert_eq!(
            controller.resolve(
                attempt.id,
                failure(&["firstNameError: too short", "dobError: invalid", "boom"])
            ),
            None
        );
        assert!(controller.can_submit());
        assert_eq!(
            controller.field_error(Field::FirstName),
            "firstNameError: too short"
        );
        assert_eq!(controller.field_error(Field::LastName), "");
        assert_eq!(controller.field_error(Field::DisplayName), "");
        assert_eq!(controller.field_error(Field::DateOfBirth), "dobError: invalid");
        match controller.phase() {
            Phase::Failure { fields, .. } => assert_eq!(fields.untagged(), ["boom".to_string()]),
            p => panic!("unexpected phase {:?}", p),
        }
    }

    #[test]
    fn resubmission_clears_errors() {
        let mut controller = SubmissionController::new(Uuid::new_v4());
        let first = controller.begin(details("J")).unwrap();
        controller.resolve(first.id, failure(&["firstNameError: too short"]));
        assert_ne!(controller.field_error(Field::FirstName), "");

        let second = controller.begin(details("Jane")).unwrap();
        assert_ne!(first.id, second.id);
        for field in Field::ALL {
            assert_eq!(controller.field_error(field), "");
        }

        // A late answer to the first attempt does not apply.
        assert_eq!(
            controller.resolve(first.id, Ok(RegisteredId::new("stale"))),
            None
        );
        assert!(controller.is_loading());

        controller.resolve(second.id, failure(&["lastNameError: required"]));
        assert_eq!(controller.field_error(Field::FirstName), "");
        assert_eq!(controller.field_error(Field::LastName), "lastNameError: required");
    }

    #[test]
    fn transport_failure_has_no_field_errors() {
        let mut controller = SubmissionController::new(Uuid::new_v4());
        let attempt = controller.begin(details("Jane")).unwrap();
        controller.resolve(
            attempt.id,
            Err(MutationError::Transport("connection refused".to_string())),
        );
        assert!(matches!(controller.phase(), Phase::Failure { .. }));
        for field in Field::ALL {
            assert_eq!(controller.field_error(field), "");
        }
        assert!(controller.begin(details("Jane")).is_some());
    }

    #[test]
    fn success_is_final() {
        let mut controller = SubmissionController::new(Uuid::new_v4());
        let attempt = controller.begin(details("Jane")).unwrap();
        assert_eq!(
            controller.resolve(attempt.id, Ok(RegisteredId::new("u123"))),
            Some(&RegisteredId::new("u123"))
        );
        assert_eq!(
            controller.phase(),
            &Phase::Success(RegisteredId::new("u123"))
        );
        assert!(!controller.can_submit());
        assert_eq!(controller.begin(details("Jane")), None);
        // The same outcome delivered twice is only applied once.
        assert_eq!(
            controller.resolve(attempt.id, Ok(RegisteredId::new("u123"))),
            None
        );
    }

    #[test]
    fn outcome_of_other_session_is_ignored() {
        let mut controller = SubmissionController::new(Uuid::new_v4());
        let mut other = SubmissionController::new(Uuid::new_v4());
        controller.begin(details("Jane")).unwrap();
        let foreign = other.begin(details("Jane")).unwrap();
        assert_eq!(foreign.id.seq, 1);
        assert_eq!(
            controller.resolve(foreign.id, Ok(RegisteredId::new("u1"))),
            None
        );
        assert!(controller.is_loading());

        // Nothing to resolve while idle either.
        let mut idle = SubmissionController::new(Uuid::new_v4());
        let id = AttemptId {
            session: Uuid::nil(),
            seq: 0,
        };
        assert_eq!(idle.resolve(id, Ok(RegisteredId::new("u1"))), None);
        assert_eq!(idle.phase(), &Phase::Idle);
    }
}
