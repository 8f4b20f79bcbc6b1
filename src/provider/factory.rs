// fitagent — Completion client factory

use super::{http::HttpCompletionClient, CompletionClient};
use crate::config::{Config, ConfigError};
use std::time::Duration;

/// Create the completion client from the loaded config.
///
/// The API key is not checked here so that offline commands can still open a
/// session; call [`Config::validate`] before sending anything.
pub fn create_client(cfg: &Config) -> Result<Box<dyn CompletionClient>, ConfigError> {
    let completion = &cfg.completion;

    tracing::debug!(
        model = %completion.model,
        api_base = %if completion.api_base.is_empty() { "(default)" } else { &completion.api_base },
        timeout_secs = completion.timeout_secs,
        "Creating completion client"
    );

    let client = HttpCompletionClient::new(
        completion.api_key.clone(),
        completion.api_base.clone(),
        completion.model.clone(),
        Duration::from_secs(completion.timeout_secs),
    )
    .map_err(|e| ConfigError::Other(format!("failed to build HTTP client: {}", e)))?;

    Ok(Box::new(client))
}
