use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::delivery::ContactPayload;
use super::domain::UserInfo;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_FIRST_NAME_LEN: usize = 50;
pub const MAX_COMPANY_LEN: usize = 100;

const STRIPPED_CHARACTERS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Validation failures for contact details, worded for the person typing them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Please enter your email address to continue.")]
    MissingEmail,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a shorter email address (at most {max} characters).")]
    EmailTooLong { max: usize },
    #[error("Please enter a shorter first name (at most {max} characters).")]
    FirstNameTooLong { max: usize },
    #[error("Please enter a shorter company name (at most {max} characters).")]
    CompanyTooLong { max: usize },
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

/// Contact details that passed [`ContactGuard::validate`]. Only the guard
/// constructs these, so holding one proves validation ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedContact {
    user: UserInfo,
}

impl ValidatedContact {
    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    pub fn into_user(self) -> UserInfo {
        self.user
    }

    /// Form fields forwarded to the CRM: markup characters stripped and the
    /// email lowercased.
    pub fn relay_payload(&self) -> ContactPayload {
        ContactPayload {
            email: strip_markup(&self.user.email.to_lowercase()),
            first_name: self.user.first_name.as_deref().map(strip_markup),
            company: self.user.company.as_deref().map(strip_markup),
        }
    }
}

/// Checks contact details before anything is persisted or relayed.
#[derive(Debug, Clone, Default)]
pub struct ContactGuard;

impl ContactGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, user: UserInfo) -> Result<ValidatedContact, IntakeError> {
        let email = user.email.trim();
        if email.is_empty() {
            return Err(IntakeError::MissingEmail);
        }
        if !email_pattern().is_match(email) {
            return Err(IntakeError::InvalidEmail);
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(IntakeError::EmailTooLong { max: MAX_EMAIL_LEN });
        }

        let first_name = optional_field(user.first_name);
        if exceeds(&first_name, MAX_FIRST_NAME_LEN) {
            return Err(IntakeError::FirstNameTooLong {
                max: MAX_FIRST_NAME_LEN,
            });
        }

        let company = optional_field(user.company);
        if exceeds(&company, MAX_COMPANY_LEN) {
            return Err(IntakeError::CompanyTooLong {
                max: MAX_COMPANY_LEN,
            });
        }

        Ok(ValidatedContact {
            user: UserInfo {
                email: email.to_string(),
                first_name,
                company,
            },
        })
    }
}

fn optional_field(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn exceeds(value: &Option<String>, max: usize) -> bool {
    value
        .as_deref()
        .map(|value| value.chars().count() > max)
        .unwrap_or(false)
}

pub fn strip_markup(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !STRIPPED_CHARACTERS.contains(ch))
        .collect()
}
