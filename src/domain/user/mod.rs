//! User domain
//!
//! This module provides domain types and traits for user records,
//! including the entity, candidate drafts, validation rules and the
//! repository trait.

mod entity;
mod messages;
mod repository;
mod validation;

pub use entity::{normalize_email, User, UserDraft, UserId};
pub use messages::{field_label, full_message, message, MessageLocale};
pub use repository::UserRepository;
pub use validation::{
    is_valid_email_format, validate, validate_email, validate_name, validate_password, ErrorKind,
    Field, FieldError, ValidationErrors, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};

#[cfg(test)]
pub use repository::MockUserRepository;
