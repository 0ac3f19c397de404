//! CLI module for User Registry
//!
//! Provides subcommands that run the user service against the configured store:
//! - `validate`: check (and optionally save) one candidate user
//! - `seed`: save a batch of factory-generated users
//! - `count`: print how many users are stored
//!
//! With the default `memory` backend every invocation starts from an empty
//! store, so `seed` and `count` only see their own process's records.

pub mod count;
pub mod seed;
pub mod validate;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::{AppConfig, StorageConfig};
use crate::domain::user::MessageLocale;
use crate::infrastructure::logging;
use crate::AppUserService;

/// User Registry - validated user records
#[derive(Parser, Debug)]
#[command(name = "user-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Language for validation messages (overrides `messages.locale`)
    #[arg(long, global = true)]
    pub locale: Option<MessageLocale>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a candidate user
    Validate(validate::ValidateArgs),

    /// Save factory-generated users
    Seed(seed::SeedArgs),

    /// Print the number of stored users (always 0 with the memory backend)
    Count,
}

/// Load configuration, install logging and build the user service
pub(crate) async fn bootstrap() -> anyhow::Result<(AppConfig, AppUserService)> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let service = crate::create_user_service_with_config(&config).await?;

    Ok((config, service))
}

/// Notice for commands whose results vanish with a non-persistent store
pub(crate) fn ephemeral_store_notice(storage: &StorageConfig) -> Option<String> {
    if storage.backend.is_persistent() {
        return None;
    }

    Some(
        "storage.backend is 'memory': records are dropped when this process exits; \
         set APP__STORAGE__BACKEND=postgres to keep them"
            .to_string(),
    )
}

/// Print the ephemeral-store notice to stderr, if any
pub(crate) fn warn_if_ephemeral(storage: &StorageConfig) {
    if let Some(notice) = ephemeral_store_notice(storage) {
        warn!(backend = ?storage.backend, "Storage is not persistent");
        eprintln!("warning: {}", notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "user-registry",
            "--locale",
            "ja",
            "validate",
            "--name",
            "test",
            "--email",
            "01@test.io",
            "--password",
            "password",
            "--activated",
        ])
        .unwrap();

        assert_eq!(cli.locale, Some(MessageLocale::Ja));
        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.name, "test");
                assert_eq!(args.email, "01@test.io");
                assert!(args.activated);
                assert!(!args.save);
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_parse_seed_defaults() {
        let cli = Cli::try_parse_from(["user-registry", "seed"]).unwrap();

        match cli.command {
            Command::Seed(args) => {
                assert_eq!(args.count, 10);
                assert_eq!(args.start, 1);
                assert!(!args.activated);
            }
            _ => panic!("expected seed"),
        }
    }

    #[test]
    fn test_memory_backend_gets_notice() {
        let memory = StorageConfig::default();
        let notice = ephemeral_store_notice(&memory).unwrap();
        assert!(notice.contains("memory"));
        assert!(notice.contains("APP__STORAGE__BACKEND=postgres"));

        let postgres = StorageConfig {
            backend: StorageBackend::Postgres,
            database_url: Some("postgres://localhost/users".to_string()),
            ..StorageConfig::default()
        };
        assert!(ephemeral_store_notice(&postgres).is_none());
    }

    #[test]
    fn test_count_help_mentions_memory() {
        let error = Cli::try_parse_from(["user-registry", "--help"]).unwrap_err();
        assert!(error.to_string().contains("always 0 with the memory backend"));
    }

    #[test]
    fn test_rejects_unknown_locale() {
        assert!(Cli::try_parse_from(["user-registry", "--locale", "fr", "count"]).is_err());
    }
}
