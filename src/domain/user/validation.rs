//! User validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::entity::UserDraft;
use super::messages::{self, MessageLocale};

pub const MAX_NAME_LENGTH: usize = 30;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Dot-separated ASCII atoms on both sides of a single `@`, at least two domain labels
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_+-]+(\.[A-Za-z0-9_+-]+)*@[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)+$").unwrap()
});

/// Validated user attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Password,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of constraint a field value violated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ErrorKind {
    Blank,
    TooLong { max: usize },
    TooShort { min: usize },
    InvalidFormat,
    Taken,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::TooLong { .. } => "too_long",
            Self::TooShort { .. } => "too_short",
            Self::InvalidFormat => "invalid_format",
            Self::Taken => "taken",
        }
    }
}

/// A single constraint violation on a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    #[serde(flatten)]
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn full_message(&self, locale: MessageLocale) -> String {
        messages::full_message(self.field, &self.kind, locale)
    }
}

/// Ordered collection of field errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, kind: ErrorKind) {
        self.0.push(FieldError { field, kind });
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Error kinds recorded for one field, in order
    pub fn on(&self, field: Field) -> Vec<&ErrorKind> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| &e.kind)
            .collect()
    }

    /// Whether `field` failed with the error identified by `code`
    pub fn has(&self, field: Field, code: &str) -> bool {
        self.0
            .iter()
            .any(|e| e.field == field && e.kind.code() == code)
    }

    pub fn full_messages(&self, locale: MessageLocale) -> Vec<String> {
        self.0.iter().map(|e| e.full_message(locale)).collect()
    }

    /// `Ok(())` when empty, otherwise the collection itself as the error
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages(MessageLocale::En).join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Whether an email matches the accepted structural grammar
pub fn is_valid_email_format(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate a name
///
/// Rules:
/// - Cannot be blank
/// - Maximum 30 characters
pub fn validate_name(name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if is_blank(name) {
        errors.add(Field::Name, ErrorKind::Blank);
    } else if char_len(name) > MAX_NAME_LENGTH {
        errors.add(Field::Name, ErrorKind::TooLong { max: MAX_NAME_LENGTH });
    }

    errors.into_result()
}

/// Validate an email
///
/// Rules:
/// - Cannot be blank
/// - Maximum 255 characters
/// - Must match the structural email grammar
///
/// Length and format failures are reported together; blank reports alone.
pub fn validate_email(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if is_blank(email) {
        errors.add(Field::Email, ErrorKind::Blank);
        return Err(errors);
    }

    if char_len(email) > MAX_EMAIL_LENGTH {
        errors.add(Field::Email, ErrorKind::TooLong { max: MAX_EMAIL_LENGTH });
    }

    if !is_valid_email_format(email) {
        errors.add(Field::Email, ErrorKind::InvalidFormat);
    }

    errors.into_result()
}

/// Validate a password
///
/// Rules:
/// - Cannot be empty
/// - Minimum 8 characters
/// - Maximum 72 characters
pub fn validate_password(password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let length = char_len(password);

    if password.is_empty() {
        errors.add(Field::Password, ErrorKind::Blank);
    } else if length < MIN_PASSWORD_LENGTH {
        errors.add(Field::Password, ErrorKind::TooShort { min: MIN_PASSWORD_LENGTH });
    } else if length > MAX_PASSWORD_LENGTH {
        errors.add(Field::Password, ErrorKind::TooLong { max: MAX_PASSWORD_LENGTH });
    }

    errors.into_result()
}

/// Run every field rule against a draft and collect all failures
///
/// Pure: never consults storage, so `taken` is not checked here.
pub fn validate(draft: &UserDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for result in [
        validate_name(&draft.name),
        validate_email(&draft.email),
        validate_password(&draft.password),
    ] {
        if let Err(e) = result {
            errors.merge(e);
        }
    }

    errors.into_result()
}
