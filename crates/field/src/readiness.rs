//! Bounded polling for a newly created native asset.
//!
//! After the host's "new asset" flow returns, the file is usually still
//! being processed. [`await_ready`] re-fetches the asset at a fixed
//! interval until it is ready or the attempt budget runs out. Running
//! out is not an error: the asset exists, it just cannot be previewed
//! yet.

use std::time::Duration;

use brandlink_core::asset::HostAsset;
use brandlink_core::clock::Clock;
use brandlink_core::config::FieldSettings;
use brandlink_core::{ContentHost, HostError};
use tokio_util::sync::CancellationToken;

/// What "ready" means for a created asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessRequirement {
    /// The file has a URL in the field locale.
    FileProcessed,
    /// The file has a URL and the asset has been published.
    Published,
}

impl ReadinessRequirement {
    pub fn is_met(&self, asset: &HostAsset, locale: &str) -> bool {
        let has_file = asset.file_url(locale).is_some();
        match self {
            Self::FileProcessed => has_file,
            Self::Published => has_file && asset.is_published(),
        }
    }
}

/// Polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Total number of fetches, including the first one.
    pub max_attempts: u32,
    /// Delay between two fetches.
    pub interval: Duration,
    pub requirement: ReadinessRequirement,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::from(&FieldSettings::default())
    }
}

impl From<&FieldSettings> for PollConfig {
    fn from(settings: &FieldSettings) -> Self {
        Self {
            max_attempts: settings.poll_max_attempts.max(1),
            interval: settings.poll_interval,
            requirement: if settings.require_published {
                ReadinessRequirement::Published
            } else {
                ReadinessRequirement::FileProcessed
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadinessError {
    /// Fetching the asset failed; polling stops.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The poll was cancelled by a newer action or teardown.
    #[error("Readiness poll cancelled")]
    Cancelled,
}

/// Poll `asset_id` until it meets `config.requirement`.
///
/// Returns `Ok(Some(asset))` as soon as a fetch is ready and `Ok(None)`
/// after `config.max_attempts` fetches without readiness. Sleeps happen
/// only between fetches, through `clock`.
pub async fn await_ready(
    host: &dyn ContentHost,
    clock: &dyn Clock,
    asset_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<Option<HostAsset>, ReadinessError> {
    let locale = host.locale().to_string();
    let max_attempts = config.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ReadinessError::Cancelled),
            fetched = host.get_asset(asset_id) => fetched,
        };
        let asset = fetched.inspect_err(|e| {
            tracing::warn!(asset_id, attempt, error = %e, "Readiness fetch failed");
        })?;

        if config.requirement.is_met(&asset, &locale) {
            tracing::info!(asset_id, attempt, "Asset is ready");
            return Ok(Some(asset));
        }

        tracing::debug!(asset_id, attempt, max_attempts, "Asset not ready yet");

        if attempt < max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ReadinessError::Cancelled),
                _ = clock.sleep(config.interval) => {}
            }
        }
    }

    tracing::warn!(asset_id, max_attempts, "Asset not ready within poll budget");
    Ok(None)
}
