//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Implementations must make the activated-email check and the write a single
/// atomic step, so two concurrent writers cannot both claim one email.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get the activated user holding an already-normalized email
    async fn find_activated_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    ///
    /// Fails with `DomainError::Conflict` when an activated record already
    /// holds the email.
    async fn insert(&self, user: User) -> Result<User, DomainError>;

    /// Replace an existing user
    ///
    /// Fails with `DomainError::Conflict` when the user is activated and
    /// another activated record holds the same email.
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// List all users, oldest first
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Count all users
    async fn count(&self) -> Result<usize, DomainError>;
}
