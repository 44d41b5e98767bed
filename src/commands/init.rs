use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` file with default settings.
///
/// # Arguments
/// - `finman_home` - The directory that will be the root of data directory, e.g. `$HOME/finman`
/// - `api_key` - The exchangerate-api.com key to store in the config, if given.
///
/// # Errors
/// - Returns an error if the directory is already initialized or if any file operations fail.
pub async fn init(finman_home: &Path, api_key: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(finman_home, api_key)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let mut message = format!(
        "Successfully created the finman directory at {}",
        config.root().display()
    );
    if config.api_key().is_none() {
        message.push_str(
            ". No exchange rate API key was given, add \"api_key\" to config.json to fetch rates",
        );
    }
    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("finman");
        let out = init(&home, Some("k")).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(home.join("config.json").is_file());

        let err = init(&home, None).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
