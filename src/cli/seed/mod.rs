//! Seed command - saves factory-generated users

use clap::Args;
use tracing::{info, warn};

use crate::domain::DomainError;
use crate::factory::UserFactory;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Number of users to create
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// First sequence number used for names and emails
    #[arg(long, default_value_t = 1)]
    pub start: u64,

    /// Create the users as activated accounts
    #[arg(long)]
    pub activated: bool,
}

/// Run the seed command
///
/// Drafts whose email is already held by an activated user are skipped.
pub async fn run(args: SeedArgs) -> anyhow::Result<()> {
    let (config, service) = super::bootstrap().await?;
    super::warn_if_ephemeral(&config.storage);
    let factory = UserFactory::starting_at(args.start);

    let mut created = 0usize;

    for _ in 0..args.count {
        let mut draft = factory.build_with(|d| d.activated = args.activated);

        match service.save(&mut draft).await {
            Ok(_) => created += 1,
            Err(DomainError::Invalid(errors)) => {
                warn!(email = %draft.email, errors = %errors, "Skipping seed user");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let total = service.count().await?;
    info!(created, total, "Seeding complete");
    println!("created {} user(s), {} stored", created, total);

    Ok(())
}
