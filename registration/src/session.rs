use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    claims::Claims,
    field::Field,
    form::FormState,
    guard::{self, Access, Denial, NO_TOKEN_PLACEHOLDER},
    services::{
        cookies::CookieStore,
        graphql::{MutationError, RegisteredId, RegistrationBackend},
        navigation::{NavigationState, Navigator},
    },
    submission::{Attempt, AttemptId, Phase, SaveIcon, SubmissionController},
};

pub const DEFAULT_TOKEN_COOKIE: &str = "token";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Name of the cookie holding the registration token.
    pub token_cookie: String,
    /// Where to send the user when there is no usable token.
    pub login_path: String,
    /// Where to send the user once registered.
    pub registered_path: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            token_cookie: DEFAULT_TOKEN_COOKIE.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            registered_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    FirstNameEdited(String),
    LastNameEdited(String),
    DisplayNameEdited(String),
    DateOfBirthEdited(NaiveDate),
    /// Submit action of the form.
    Submit,
    /// Explicit save control.
    Save,
    Registered(AttemptId, Result<RegisteredId, MutationError>),
}

/// Run an attempt against the backend.
pub async fn perform<B: RegistrationBackend + ?Sized>(backend: &B, attempt: Attempt) -> Message {
    let outcome = backend.register(&attempt.details).await;
    Message::Registered(attempt.id, outcome)
}

/// What is displayed at the registration page.
pub enum Screen<N: Navigator> {
    /// The user was redirected, only a placeholder is shown.
    NoToken(Denial),
    Form(RegistrationSession<N>),
}

impl<N: Navigator> Screen<N> {
    /// Read the token once and either open the form or redirect to the login page.
    pub fn start<C: CookieStore + ?Sized>(
        settings: &SessionSettings,
        cookies: &C,
        mut navigator: N,
        today: NaiveDate,
    ) -> Self {
        let token = cookies.get(&settings.token_cookie);
        match guard::evaluate(token.as_deref()) {
            Access::Denied(denial) => {
                tracing::warn!("Registration form unavailable: {}", denial);
                navigator.navigate(&settings.login_path, None);
                Self::NoToken(denial)
            }
            Access::Granted(claims) => Self::Form(RegistrationSession::new(
                claims,
                settings.registered_path.clone(),
                navigator,
                today,
            )),
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::NoToken(_) => Some(NO_TOKEN_PLACEHOLDER),
            Self::Form(_) => None,
        }
    }

    pub fn session(&self) -> Option<&RegistrationSession<N>> {
        match self {
            Self::NoToken(_) => None,
            Self::Form(session) => Some(session),
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut RegistrationSession<N>> {
        match self {
            Self::NoToken(_) => None,
            Self::Form(session) => Some(session),
        }
    }
}

pub struct RegistrationSession<N: Navigator> {
    id: Uuid,
    claims: Claims,
    form: FormState,
    submission: SubmissionController,
    navigator: N,
    registered_path: String,
    ended: bool,
}

impl<N: Navigator> RegistrationSession<N> {
    fn new(claims: Claims, registered_path: String, navigator: N, today: NaiveDate) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!("Opening registration session {}", id);
        Self {
            id,
            form: FormState::new(&claims, today),
            claims,
            submission: SubmissionController::new(id),
            navigator,
            registered_path,
            ended: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn phase(&self) -> &Phase {
        self.submission.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.submission.is_loading()
    }

    pub fn can_submit(&self) -> bool {
        !self.ended && self.submission.can_submit()
    }

    pub fn save_icon(&self) -> SaveIcon {
        self.submission.save_icon()
    }

    pub fn field_error(&self, field: Field) -> &str {
        self.submission.field_error(field)
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// The page was left. Anything received afterwards is dropped.
    pub fn end(&mut self) {
        tracing::debug!("Closing registration session {}", self.id);
        self.ended = true;
    }

    /// Apply a message. Returns the attempt to perform if it started a submission.
    pub fn update(&mut self, message: Message) -> Option<Attempt> {
        if self.ended {
            tracing::debug!("Session {} ended, dropping {:?}", self.id, message);
            return None;
        }

        match message {
            Message::FirstNameEdited(value) => self.form.set_first_name(value),
            Message::LastNameEdited(value) => self.form.set_last_name(value),
            Message::DisplayNameEdited(value) => self.form.set_display_name(value),
            Message::DateOfBirthEdited(date) => {
                if let Err(e) = self.form.set_date_of_birth(date) {
                    tracing::warn!("{}", e);
                }
            }
            Message::Submit | Message::Save => {
                return self.submission.begin(self.form.snapshot());
            }
            Message::Registered(id, outcome) => {
                if self.submission.resolve(id, outcome).is_some() {
                    self.navigator.navigate(
                        &self.registered_path,
                        Some(NavigationState::registered(self.claims.prov.clone())),
                    );
                }
            }
        }
        None
    }

    /// Submit the current values and wait for the outcome.
    pub async fn submit<B: RegistrationBackend + ?Sized>(&mut self, backend: &B) -> &Phase {
        if let Some(attempt) = self.update(Message::Submit) {
            let message = perform(backend, attempt).await;
            self.update(message);
        }
        self.phase()
    }
}
