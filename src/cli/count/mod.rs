//! Count command - prints the number of stored users

/// Run the count command
pub async fn run() -> anyhow::Result<()> {
    let (config, service) = super::bootstrap().await?;
    super::warn_if_ephemeral(&config.storage);

    println!("{}", service.count().await?);

    Ok(())
}
