//! Environment/runtime helpers
//!
//! Sanity checks to ensure the data directory exists at startup.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("cannot create data directory {dir}: {source}")]
    DataDir {
        dir: String,
        #[source]
        source: std::io::Error,
    },
    #[error("data path {0} exists but is not a directory")]
    NotADirectory(String),
}

/// Ensure the data directory exists, creating it when missing.
/// Collection files themselves are never created here: an absent file is an empty collection.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), EnvError> {
    let shown = data_dir.display().to_string();
    match tokio::fs::metadata(data_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(EnvError::NotADirectory(shown)),
        Err(_) => {
            warn!(data_dir = %shown, "data directory not found; creating it");
            tokio::fs::create_dir_all(data_dir)
                .await
                .map_err(|source| EnvError::DataDir { dir: shown.clone(), source })?;
            info!(data_dir = %shown, "data directory created");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_data_dir() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("storefront_env_{}", uuid::Uuid::new_v4()));
        ensure_data_dir(&dir).await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());
        // second call is a no-op
        ensure_data_dir(&dir).await?;
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_file_in_place_of_dir() -> Result<(), anyhow::Error> {
        let file = std::env::temp_dir().join(format!("storefront_env_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&file, b"[]").await?;
        assert!(matches!(ensure_data_dir(&file).await, Err(EnvError::NotADirectory(_))));
        let _ = tokio::fs::remove_file(&file).await;
        Ok(())
    }
}
