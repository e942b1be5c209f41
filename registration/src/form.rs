use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{claims::Claims, field::Field};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    FutureDate(NaiveDate),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::FutureDate(d) => write!(f, "date of birth {} is in the future", d),
        }
    }
}

impl std::error::Error for FormError {}

/// Payload of the registration mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistrationDetails {
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub dob: NaiveDate,
}

/// Name as given by the identity provider, kept apart from the edited values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimDefaults {
    pub first_name: String,
    pub last_name: String,
}

/// Split a full name into a first name and the rest of it.
pub fn split_name(name: Option<&str>) -> (String, String) {
    let mut words = name.unwrap_or_default().split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let rest = words.collect::<Vec<_>>().join(" ");
    (first, rest)
}

#[derive(Debug, Clone)]
pub struct FormState {
    defaults: ClaimDefaults,
    email: Option<String>,
    today: NaiveDate,

    first_name: String,
    last_name: String,
    display_name: String,
    date_of_birth: NaiveDate,
}

impl FormState {
    pub fn new(claims: &Claims, today: NaiveDate) -> Self {
        let (first_name, last_name) = split_name(claims.name.as_deref());
        Self {
            defaults: ClaimDefaults {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
            },
            email: claims.email.clone(),
            today,
            first_name,
            last_name,
            display_name: String::new(),
            date_of_birth: today,
        }
    }

    pub fn defaults(&self) -> &ClaimDefaults {
        &self.defaults
    }

    /// Email of the token, displayed read-only.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn set_first_name(&mut self, value: String) {
        self.first_name = value;
    }

    pub fn set_last_name(&mut self, value: String) {
        self.last_name = value;
    }

    pub fn set_display_name(&mut self, value: String) {
        self.display_name = value;
    }

    /// The date picker does not allow picking a future date, the previous value is kept.
    pub fn set_date_of_birth(&mut self, date: NaiveDate) -> Result<(), FormError> {
        if date > self.today {
            return Err(FormError::FutureDate(date));
        }
        self.date_of_birth = date;
        Ok(())
    }

    /// Required fields left empty. Only used for markers, submission is never blocked.
    pub fn missing_required(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| f.is_required())
            .filter(|f| match f {
                Field::FirstName => self.first_name.is_empty(),
                Field::LastName => self.last_name.is_empty(),
                Field::DisplayName => self.display_name.is_empty(),
                // Always holds a date.
                Field::DateOfBirth => false,
            })
            .collect()
    }

    pub fn snapshot(&self) -> RegistrationDetails {
        RegistrationDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            display_name: self.display_name.clone(),
            dob: self.date_of_birth,
        }
    }
}
