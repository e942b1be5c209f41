//! Editable fields of the registration form and the errors the server reports against them.
//!
//! The registration mutation has no dedicated channel for validation errors: they are sent in the
//! generic GraphQL error list and routed by a `<fieldTag>Error:` prefix, e.g.
//! `firstNameError: must not be empty`. Messages are parsed once into [`FieldError`] when a
//! response comes in.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    DisplayName,
    DateOfBirth,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::FirstName,
        Field::LastName,
        Field::DisplayName,
        Field::DateOfBirth,
    ];

    /// Name of the field in the mutation payload and in error tags.
    pub fn tag(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::DisplayName => "displayName",
            Self::DateOfBirth => "dob",
        }
    }

    pub fn error_prefix(self) -> &'static str {
        match self {
            Self::FirstName => "firstNameError:",
            Self::LastName => "lastNameError:",
            Self::DisplayName => "displayNameError:",
            Self::DateOfBirth => "dobError:",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::DisplayName => "Display Name",
            Self::DateOfBirth => "Date of Birth",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Self::FirstName | Self::DateOfBirth)
    }

    fn of_message(message: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| message.starts_with(field.error_prefix()))
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A server message routed to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    /// The full server message, tag included, as it is displayed under the field.
    pub message: String,
}

impl FieldError {
    pub fn parse(message: &str) -> Option<Self> {
        Field::of_message(message).map(|field| Self {
            field,
            message: message.to_string(),
        })
    }

    /// The message without its tag.
    pub fn detail(&self) -> &str {
        self.message[self.field.error_prefix().len()..].trim_start()
    }
}

/// First message of the list tagged for `field`, or an empty string.
pub fn classify<S: AsRef<str>>(messages: Option<&[S]>, field: Field) -> &str {
    messages
        .unwrap_or_default()
        .iter()
        .map(S::as_ref)
        .find(|m| m.starts_with(field.error_prefix()))
        .unwrap_or("")
}

/// Errors of a failed attempt, split between fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    tagged: Vec<FieldError>,
    untagged: Vec<String>,
}

impl FieldErrors {
    pub fn classify<S: AsRef<str>>(messages: Option<&[S]>) -> Self {
        let mut errors = Self::default();
        for message in messages.unwrap_or_default().iter().map(S::as_ref) {
            match FieldError::parse(message) {
                Some(e) => errors.tagged.push(e),
                None => errors.untagged.push(message.to_string()),
            }
        }
        errors
    }

    /// Error to display under `field`, empty if there is none.
    pub fn get(&self, field: Field) -> &str {
        self.tagged
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
            .unwrap_or("")
    }

    pub fn tagged(&self) -> &[FieldError] {
        &self.tagged
    }

    /// Messages with no known field tag. Not rendered by the form.
    pub fn untagged(&self) -> &[String] {
        &self.untagged
    }

    pub fn is_empty(&self) -> bool {
        self.tagged.is_empty() && self.untagged.is_empty()
    }
}
