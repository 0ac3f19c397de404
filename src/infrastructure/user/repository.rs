//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
///
/// Locks are always taken in the order `users`, then `activated_emails`.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    /// Index for activated email -> user ID lookup
    activated_emails: Arc<RwLock<HashMap<String, UserId>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            activated_emails: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository with initial users
    ///
    /// When several activated users share an email, the first one wins the index.
    pub fn with_users(users: Vec<User>) -> Self {
        let mut users_map = HashMap::new();
        let mut email_map = HashMap::new();

        for user in users {
            if user.is_activated() {
                email_map
                    .entry(user.email().to_string())
                    .or_insert(*user.id());
            }
            users_map.insert(*user.id(), user);
        }

        Self {
            users: Arc::new(RwLock::new(users_map)),
            activated_emails: Arc::new(RwLock::new(email_map)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken(email: &str) -> DomainError {
    DomainError::conflict(format!("Email '{}' is held by an activated user", email))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_activated_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        let activated_emails = self.activated_emails.read().await;

        Ok(activated_emails
            .get(email)
            .and_then(|id| users.get(id))
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut activated_emails = self.activated_emails.write().await;

        let id = *user.id();

        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if activated_emails.contains_key(user.email()) {
            return Err(email_taken(user.email()));
        }

        if user.is_activated() {
            activated_emails.insert(user.email().to_string(), id);
        }

        users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut activated_emails = self.activated_emails.write().await;

        let id = *user.id();

        let Some(old_user) = users.get(&id) else {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        };

        if user.is_activated() {
            if let Some(holder) = activated_emails.get(user.email()) {
                if *holder != id {
                    return Err(email_taken(user.email()));
                }
            }
        }

        // Release the old index entry if this user held it
        if activated_emails.get(old_user.email()) == Some(&id) {
            activated_emails.remove(old_user.email());
        }

        if user.is_activated() {
            activated_emails.insert(user.email().to_string(), id);
        }

        users.insert(id, user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        let mut activated_emails = self.activated_emails.write().await;

        if let Some(user) = users.remove(id) {
            if activated_emails.get(user.email()) == Some(id) {
                activated_emails.remove(user.email());
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by_key(|u| u.created_at());

        Ok(result)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let users = self.users.read().await;
        Ok(users.len())
    }
}
