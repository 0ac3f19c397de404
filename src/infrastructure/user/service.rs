//! User service: validation and persistence contract

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::user::{
    normalize_email, validate, ErrorKind, Field, User, UserDraft, UserId, UserRepository,
    ValidationErrors,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// User service for validation and persistence
#[derive(Debug)]
pub struct UserService<R: UserRepository + ?Sized, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

fn taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(Field::Email, ErrorKind::Taken);
    errors
}

impl<R: UserRepository + ?Sized, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Field rules plus the activated-email check, without persisting
    async fn collect_errors(&self, draft: &UserDraft) -> Result<ValidationErrors, DomainError> {
        let mut errors = validate(draft).err().unwrap_or_default();

        if self.email_taken(&draft.email).await? {
            errors.add(Field::Email, ErrorKind::Taken);
        }

        Ok(errors)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.repository.find_activated_by_email(email).await?.is_some())
    }

    /// Check whether a draft could be saved right now
    ///
    /// Normalizes the draft's email in place.
    pub async fn check(&self, draft: &mut UserDraft) -> Result<(), DomainError> {
        draft.normalize();

        self.collect_errors(draft).await?.into_result().map_err(|errors| {
            debug!(email = %draft.email, errors = %errors, "User draft is invalid");
            DomainError::Invalid(errors)
        })
    }

    /// Validate and persist a draft
    ///
    /// The draft's email is lowercased before anything else, and stays
    /// lowercased even when the save is rejected.
    pub async fn save(&self, draft: &mut UserDraft) -> Result<User, DomainError> {
        draft.normalize();

        let errors = self.collect_errors(draft).await?;

        if !errors.is_empty() {
            debug!(email = %draft.email, errors = %errors, "User rejected");
            return Err(DomainError::Invalid(errors));
        }

        let password_hash = self.hasher.hash(&draft.password)?;
        let user = User::new(
            UserId::generate(),
            &draft.name,
            &draft.email,
            password_hash,
            draft.activated,
        );

        match self.repository.insert(user).await {
            Ok(user) => {
                info!(
                    user_id = %user.id(),
                    activated = user.is_activated(),
                    "User saved"
                );
                Ok(user)
            }
            Err(e) if e.is_conflict() => {
                warn!(email = %draft.email, "Email claimed by an activated user during save");
                Err(DomainError::Invalid(taken()))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a user, releasing its email
    pub async fn destroy(&self, id: &UserId) -> Result<bool, DomainError> {
        let deleted = self.repository.delete(id).await?;

        if deleted {
            info!(user_id = %id, "User destroyed");
        }

        Ok(deleted)
    }

    /// Activate a user, claiming its email
    pub async fn activate(&self, id: &UserId) -> Result<User, DomainError> {
        let mut user = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if user.is_activated() {
            return Ok(user);
        }

        user.activate();

        match self.repository.update(&user).await {
            Ok(user) => {
                info!(user_id = %id, "User activated");
                Ok(user)
            }
            Err(e) if e.is_conflict() => {
                warn!(user_id = %id, email = %user.email(), "Activation blocked by existing email");
                Err(DomainError::Invalid(taken()))
            }
            Err(e) => Err(e),
        }
    }

    /// Get a user by ID
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Get the activated user holding an email, in any letter case
    pub async fn find_activated_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.repository
            .find_activated_by_email(&normalize_email(email))
            .await
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// Count users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Check a password against a stored user's hash
    pub async fn verify_password(&self, id: &UserId, password: &str) -> Result<bool, DomainError> {
        let user = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        Ok(self.hasher.verify(password, user.password_hash()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MessageLocale, MockUserRepository};
    use crate::factory::UserFactory;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    /// Reversible stand-in so tests do not pay for Argon2
    #[derive(Debug, Default)]
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            Ok(format!("plain${}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash.strip_prefix("plain$") == Some(password)
        }
    }

    fn create_service() -> UserService<InMemoryUserRepository, PlainHasher> {
        UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(PlainHasher),
        )
    }

    fn draft(email: &str, activated: bool) -> UserDraft {
        UserDraft::new("test", email, "password").with_activated(activated)
    }

    fn messages(error: &DomainError) -> Vec<String> {
        error
            .validation_errors()
            .map(|e| e.full_messages(MessageLocale::Ja))
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_save_name_within_limit() {
        let service = create_service();
        let mut draft = UserDraft::new("a".repeat(30), "01@test.io", "password");

        assert_eq!(service.count().await.unwrap(), 0);
        service.save(&mut draft).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_missing_name() {
        let service = create_service();
        let mut draft = UserDraft::new("", "01@test.io", "password");

        let error = service.save(&mut draft).await.unwrap_err();
        assert_eq!(messages(&error), vec!["名前を入力してください"]);
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_email_at_length_limit() {
        let service = create_service();
        let domain = "@test.io";
        let email = format!("{}{}", "a".repeat(255 - domain.len()), domain);
        let mut draft = UserDraft::new("test", email, "password");

        service.save(&mut draft).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_email_over_limit() {
        let service = create_service();
        let domain = "@test.io";
        let email = format!("{}{}", "a".repeat(256 - domain.len()), domain);
        let mut draft = UserDraft::new("test", email, "password");

        let error = service.save(&mut draft).await.unwrap_err();
        assert_eq!(
            messages(&error),
            vec!["メールアドレスは255文字以内で入力してください"]
        );
    }

    #[tokio::test]
    async fn test_save_downcases_email() {
        let service = create_service();
        let mut draft = UserDraft::new("test", "UPPERCASE@TEST.IO", "password");

        let user = service.save(&mut draft).await.unwrap();

        assert_eq!(user.email(), "uppercase@test.io");
        assert_eq!(draft.email, "uppercase@test.io");
    }

    #[tokio::test]
    async fn test_failed_save_still_downcases_draft() {
        let service = create_service();
        let mut draft = UserDraft {
            email: "UPPERCASE@TEST.IO".to_string(),
            ..Default::default()
        };

        assert!(service.save(&mut draft).await.is_err());
        assert_eq!(draft.email, "uppercase@test.io");
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unactivated_users_share_email() {
        let service = create_service();

        service.save(&mut draft("01@test.io", false)).await.unwrap();

        assert!(service.check(&mut draft("01@test.io", false)).await.is_ok());
        service.save(&mut draft("01@test.io", false)).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_activated_user_blocks_same_email() {
        let service = create_service();

        service.save(&mut draft("01@test.io", true)).await.unwrap();

        let error = service
            .save(&mut draft("01@test.io", false))
            .await
            .unwrap_err();
        assert_eq!(messages(&error), vec!["メールアドレスはすでに存在します"]);
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_taken_check_ignores_case() {
        let service = create_service();

        service.save(&mut draft("01@test.io", true)).await.unwrap();

        let error = service
            .check(&mut draft("01@TEST.IO", true))
            .await
            .unwrap_err();
        assert!(error
            .validation_errors()
            .is_some_and(|e| e.has(Field::Email, "taken")));
    }

    #[tokio::test]
    async fn test_destroy_releases_email() {
        let service = create_service();

        let first = service.save(&mut draft("01@test.io", true)).await.unwrap();
        assert!(service.destroy(first.id()).await.unwrap());

        assert!(service.check(&mut draft("01@test.io", true)).await.is_ok());
        service.save(&mut draft("01@test.io", true)).await.unwrap();
    }

    #[tokio::test]
    async fn test_destroy_missing_user() {
        let service = create_service();
        assert!(!service.destroy(&UserId::generate()).await.unwrap());
    }

    #[tokio::test]
    async fn test_field_errors_and_taken_reported_together() {
        let service = create_service();

        service.save(&mut draft("01@test.io", true)).await.unwrap();

        let mut invalid = UserDraft::new("", "01@test.io", "short");
        let error = service.save(&mut invalid).await.unwrap_err();
        assert_eq!(
            messages(&error),
            vec![
                "名前を入力してください",
                "パスワードは8文字以上で入力してください",
                "メールアドレスはすでに存在します",
            ]
        );
    }

    #[tokio::test]
    async fn test_password_boundaries() {
        let service = create_service();

        let mut at_max = UserDraft::new("test", "01@test.io", "a".repeat(72));
        assert!(service.check(&mut at_max).await.is_ok());

        let mut at_min = UserDraft::new("test", "01@test.io", "a".repeat(8));
        assert!(service.check(&mut at_min).await.is_ok());

        let mut too_long = UserDraft::new("test", "01@test.io", "a".repeat(73));
        let error = service.check(&mut too_long).await.unwrap_err();
        assert_eq!(messages(&error), vec!["パスワードは72文字以内で入力してください"]);

        let mut too_short = UserDraft::new("test", "01@test.io", "a".repeat(7));
        let error = service.check(&mut too_short).await.unwrap_err();
        assert_eq!(messages(&error), vec!["パスワードは8文字以上で入力してください"]);
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let service = create_service();
        let mut draft = UserDraft::new("Name 1", "Mixed@Test.IO", "password");

        let saved = service.save(&mut draft).await.unwrap();
        let reloaded = service.get(saved.id()).await.unwrap().unwrap();

        assert_eq!(reloaded, saved);
        assert_eq!(reloaded.name(), "Name 1");
        assert_eq!(reloaded.email(), "mixed@test.io");
        assert_ne!(reloaded.password_hash(), "password");
    }

    #[tokio::test]
    async fn test_activate() {
        let service = create_service();

        let user = service.save(&mut draft("01@test.io", false)).await.unwrap();
        let activated = service.activate(user.id()).await.unwrap();

        assert!(activated.is_activated());

        let holder = service.find_activated_by_email("01@TEST.io").await.unwrap();
        assert_eq!(holder.map(|u| *u.id()), Some(*user.id()));

        // Activating twice is a no-op
        assert!(service.activate(user.id()).await.unwrap().is_activated());
    }

    #[tokio::test]
    async fn test_activate_blocked_by_existing_holder() {
        let service = create_service();

        let pending = service.save(&mut draft("01@test.io", false)).await.unwrap();
        service.save(&mut draft("01@test.io", true)).await.unwrap();

        let error = service.activate(pending.id()).await.unwrap_err();
        assert_eq!(messages(&error), vec!["メールアドレスはすでに存在します"]);
    }

    #[tokio::test]
    async fn test_activate_missing_user() {
        let service = create_service();

        let result = service.activate(&UserId::generate()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_factory_drafts_save() {
        let service = create_service();
        let factory = UserFactory::new();

        for _ in 0..3 {
            service.save(&mut factory.next_draft()).await.unwrap();
        }

        let users = service.list().await.unwrap();
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn test_verify_password_with_argon2() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
        );

        let user = service.save(&mut draft("01@test.io", false)).await.unwrap();

        assert!(user.password_hash().starts_with("$argon2"));
        assert!(service.verify_password(user.id(), "password").await.unwrap());
        assert!(!service.verify_password(user.id(), "passw0rd").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_conflict_becomes_taken() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_activated_by_email()
            .returning(|_| Ok(None));
        repository
            .expect_insert()
            .times(1)
            .returning(|user| Err(DomainError::conflict(format!("{} taken", user.email()))));

        let service = UserService::new(Arc::new(repository), Arc::new(PlainHasher));

        let error = service
            .save(&mut draft("01@test.io", true))
            .await
            .unwrap_err();
        assert_eq!(messages(&error), vec!["メールアドレスはすでに存在します"]);
    }

    #[tokio::test]
    async fn test_blank_password_rejected_before_hashing() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
        );

        let mut blank = UserDraft::new("test", "01@test.io", "");
        let error = service.save(&mut blank).await.unwrap_err();

        // An Internal error here would mean the empty value reached Argon2
        assert_eq!(messages(&error), vec!["パスワードを入力してください"]);
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_activated_by_email()
            .returning(|_| Err(DomainError::storage("connection refused")));
        repository.expect_insert().never();

        let service = UserService::new(Arc::new(repository), Arc::new(PlainHasher));

        let result = service.save(&mut draft("01@test.io", false)).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_works_behind_trait_object() {
        let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let service = UserService::new(repository, Arc::new(PlainHasher));

        service.save(&mut draft("01@test.io", false)).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 1);
    }
}
