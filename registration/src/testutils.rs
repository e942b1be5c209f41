use crate::{
    form::RegistrationDetails,
    services::{
        graphql::{MutationError, RegisteredId, RegistrationBackend},
        navigation::{NavigationState, Navigator},
    },
};

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::NaiveDate;

/// Build an unsigned compact token carrying the given claims.
pub fn token(claims: serde_json::Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

pub fn details(first_name: &str) -> RegistrationDetails {
    RegistrationDetails {
        first_name: first_name.to_string(),
        last_name: String::new(),
        display_name: String::new(),
        dob: today(),
    }
}

/// Backend replaying canned outcomes and recording the payloads it was sent.
pub struct DummyBackend {
    outcomes: Mutex<VecDeque<Result<RegisteredId, MutationError>>>,
    pub calls: Mutex<Vec<RegistrationDetails>>,
}

impl DummyBackend {
    pub fn new(outcomes: Vec<Result<RegisteredId, MutationError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RegistrationDetails> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistrationBackend for DummyBackend {
    async fn register(&self, details: &RegistrationDetails) -> Result<RegisteredId, MutationError> {
        self.calls.lock().unwrap().push(details.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MutationError::Transport("no canned outcome".to_string())))
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visits: Vec<(String, Option<NavigationState>)>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, path: &str, state: Option<NavigationState>) {
        self.visits.push((path.to_string(), state));
    }
}
