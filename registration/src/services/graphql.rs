use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http::{NotSuccessResponseInfo, ResponseExt};
use crate::form::RegistrationDetails;

pub const REGISTER_OPERATION: &str = "UserRegister";

pub const REGISTER_MUTATION: &str = r#"
mutation UserRegister($details: UserRegistration) {
	users {
		register(details: $details) {
			id
		}
	}
}
"#;

/// Identifier of the registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawId")]
pub struct RegisteredId(String);

impl RegisteredId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegisteredId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// GraphQL IDs are serialized as strings but some servers send integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    /// An empty string or a zero is no identifier.
    fn is_present(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => n.as_f64() != Some(0.0),
        }
    }
}

impl From<RawId> for RegisteredId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// Messages of the GraphQL error list, in server order.
    GraphQl(Vec<String>),
    Http(NotSuccessResponseInfo),
    /// The mutation completed without returning an id.
    MissingId,
    Decode(String),
    Transport(String),
}

impl MutationError {
    /// Messages the field errors are classified from. Only GraphQL errors carry them.
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            Self::GraphQl(messages) => Some(messages.as_slice()),
            _ => None,
        }
    }
}

impl std::fmt::Display for MutationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::GraphQl(messages) => write!(f, "Registration refused: {}", messages.join(", ")),
            Self::Http(info) => write!(f, "Registration request failed: {}", info),
            Self::MissingId => write!(f, "Registration response carries no user id"),
            Self::Decode(e) => write!(f, "Invalid registration response: {}", e),
            Self::Transport(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl std::error::Error for MutationError {}

impl From<reqwest::Error> for MutationError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Executor of the remote registration mutation.
#[async_trait]
pub trait RegistrationBackend: Send + Sync {
    async fn register(&self, details: &RegistrationDetails) -> Result<RegisteredId, MutationError>;
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    query: &'static str,
    #[serde(rename = "operationName")]
    operation_name: &'static str,
    variables: RegisterVariables<'a>,
}

#[derive(Debug, Serialize)]
struct RegisterVariables<'a> {
    details: &'a RegistrationDetails,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<RegisterData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RegisterData {
    users: Option<UsersMutation>,
}

#[derive(Debug, Deserialize)]
struct UsersMutation {
    register: Option<RegisterPayload>,
}

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    id: Option<RawId>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Interpret the status and body of a response to the registration mutation.
pub fn parse_response(status: u16, body: &str) -> Result<RegisteredId, MutationError> {
    let response: GraphQlResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(_) if !is_success(status) => {
            return Err(MutationError::Http(NotSuccessResponseInfo {
                status_code: status,
                text: body.to_string(),
            }))
        }
        Err(e) => return Err(MutationError::Decode(e.to_string())),
    };

    let errors = response.errors.unwrap_or_default();
    if !errors.is_empty() {
        return Err(MutationError::GraphQl(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    if !is_success(status) {
        return Err(MutationError::Http(NotSuccessResponseInfo {
            status_code: status,
            text: body.to_string(),
        }));
    }

    response
        .data
        .and_then(|d| d.users)
        .and_then(|u| u.register)
        .and_then(|r| r.id)
        .filter(RawId::is_present)
        .map(RegisteredId::from)
        .ok_or(MutationError::MissingId)
}

#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    url: String,
}

impl GraphQlClient {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl RegistrationBackend for GraphQlClient {
    async fn register(&self, details: &RegistrationDetails) -> Result<RegisteredId, MutationError> {
        let request = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&RegisterRequest {
                query: REGISTER_MUTATION,
                operation_name: REGISTER_OPERATION,
                variables: RegisterVariables { details },
            });
        tracing::debug!("Sending registration mutation to {}", self.url);

        let (status, text) = request.send().await?.status_and_text().await?;
        parse_response(status, &text)
    }
}
