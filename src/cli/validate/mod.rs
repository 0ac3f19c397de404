//! Validate command - checks one candidate user against the rules and the store

use clap::Args;
use serde_json::json;
use tracing::info;

use crate::domain::user::{MessageLocale, UserDraft, ValidationErrors};
use crate::domain::DomainError;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Display name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Email address
    #[arg(long, default_value = "")]
    pub email: String,

    /// Plaintext password
    #[arg(long, default_value = "")]
    pub password: String,

    /// Treat the candidate as an activated account
    #[arg(long)]
    pub activated: bool,

    /// Persist the user when it is valid
    #[arg(long)]
    pub save: bool,
}

impl From<ValidateArgs> for UserDraft {
    fn from(args: ValidateArgs) -> Self {
        UserDraft::new(args.name, args.email, args.password).with_activated(args.activated)
    }
}

/// Run the validate command
///
/// Prints a JSON report on stdout and fails when the candidate is invalid.
pub async fn run(args: ValidateArgs, locale: Option<MessageLocale>) -> anyhow::Result<()> {
    let (config, service) = super::bootstrap().await?;
    let locale = locale.unwrap_or(config.messages.locale);

    let save = args.save;
    let mut draft = UserDraft::from(args);

    let result = if save {
        service.save(&mut draft).await.map(Some)
    } else {
        service.check(&mut draft).await.map(|_| None)
    };

    match result {
        Ok(saved) => {
            let report = json!({
                "valid": true,
                "email": draft.email,
                "user": saved,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);

            if let Some(user) = saved {
                info!(user_id = %user.id(), "Saved user from command line");
            }

            Ok(())
        }
        Err(DomainError::Invalid(errors)) => {
            println!("{}", serde_json::to_string_pretty(&invalid_report(&draft, &errors, locale))?);
            anyhow::bail!("{} validation error(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn invalid_report(
    draft: &UserDraft,
    errors: &ValidationErrors,
    locale: MessageLocale,
) -> serde_json::Value {
    json!({
        "valid": false,
        "email": draft.email,
        "errors": errors,
        "messages": errors.full_messages(locale),
    })
}
