//! Environment/runtime helpers
//!
//! Sanity checks to ensure the data directory exists at startup.

/// Ensure the directory holding the store document exists.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    Ok(())
}
