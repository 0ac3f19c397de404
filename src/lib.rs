//! User Registry
//!
//! Validated user records with:
//! - Field rules for name, email and password with localized messages
//! - Email normalization and uniqueness scoped to activated users
//! - In-memory and PostgreSQL storage behind one repository trait
//! - A sequence-based fixture factory

pub mod cli;
pub mod config;
pub mod domain;
pub mod factory;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use crate::config::StorageBackend;
use domain::user::UserRepository;
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService,
};
use tracing::info;

/// User service over whichever repository the configuration selects
pub type AppUserService = UserService<dyn UserRepository, Argon2Hasher>;

/// Create the user service with the default configuration
pub async fn create_user_service() -> anyhow::Result<AppUserService> {
    create_user_service_with_config(&AppConfig::default()).await
}

/// Create the user service with custom configuration
pub async fn create_user_service_with_config(config: &AppConfig) -> anyhow::Result<AppUserService> {
    let repository = create_repository(config).await?;
    Ok(UserService::new(repository, Arc::new(Argon2Hasher::new())))
}

async fn create_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    info!("Storage backend: {:?}", config.storage.backend);

    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryUserRepository::new())),
        StorageBackend::Postgres => {
            let database_url = config.storage.resolve_database_url().ok_or_else(|| {
                anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres")
            })?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.storage.max_connections)
                .connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let repository = PostgresUserRepository::new(pool);
            repository.migrate().await?;

            Ok(Arc::new(repository))
        }
    }
}
