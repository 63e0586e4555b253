//! Conversion of native and external assets into the field's single
//! value shape, and the reads and writes of that value.
//!
//! Every path that puts something into the field goes through
//! [`AssetBinder`], so the field only ever receives the tagged
//! [`UnifiedAsset`] shape regardless of where the asset came from.

use std::sync::Arc;

use brandlink_core::field_value::{self, StoredValue};
use brandlink_core::{ContentHost, CoreError, FieldChange, HostError, SearchResult, UnifiedAsset};
use brandlink_events::Subscription;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error(transparent)]
    Host(#[from] HostError),

    /// An external selection without a source URL cannot be stored.
    #[error("Selected asset {0} has no source URL")]
    MissingSource(String),

    /// The field holds a value that is not an asset.
    #[error(transparent)]
    Unreadable(#[from] CoreError),
}

/// Reads and writes the asset held by one field.
#[derive(Clone)]
pub struct AssetBinder {
    host: Arc<dyn ContentHost>,
}

impl AssetBinder {
    pub fn new(host: Arc<dyn ContentHost>) -> Self {
        Self { host }
    }

    /// Fetch native asset `id` and convert it in the field locale.
    pub async fn bind_native(&self, id: &str) -> Result<UnifiedAsset, BindError> {
        let asset = self.host.get_asset(id).await.inspect_err(|e| {
            tracing::warn!(asset_id = id, error = %e, "Failed to fetch native asset");
        })?;
        Ok(UnifiedAsset::from_host_asset(&asset, self.host.locale()))
    }

    /// Convert an already-normalized search result. No network call.
    pub fn bind_external(&self, result: &SearchResult) -> Result<UnifiedAsset, BindError> {
        if result.source_url.trim().is_empty() {
            return Err(BindError::MissingSource(result.id.clone()));
        }
        Ok(UnifiedAsset::from_search_result(result))
    }

    /// Replace the field value with `asset`.
    pub async fn write(&self, asset: &UnifiedAsset) -> Result<(), BindError> {
        self.host
            .set_field_value(field_value::encode(asset))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to write field value"))?;
        tracing::info!(
            kind = asset.kind().as_str(),
            asset_id = asset.native_id().unwrap_or("-"),
            "Field value written",
        );
        Ok(())
    }

    /// Remove the field value.
    pub async fn clear(&self) -> Result<(), BindError> {
        self.host
            .remove_field_value()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to clear field value"))?;
        tracing::info!("Field value cleared");
        Ok(())
    }

    /// Turn a stored value into an asset, fetching native references.
    ///
    /// A reference that cannot be fetched yields an un-previewable
    /// native asset so the editor can still reload or open it.
    pub async fn resolve(&self, stored: StoredValue) -> UnifiedAsset {
        match stored {
            StoredValue::Asset(asset) => asset,
            StoredValue::NativeLink(id) => match self.bind_native(&id).await {
                Ok(asset) => asset,
                Err(_) => UnifiedAsset::unresolved_native(id),
            },
        }
    }

    /// Decode and resolve a raw field value.
    ///
    /// `None` means the field is empty; malformed values are reported as
    /// [`BindError::Unreadable`] so callers can keep their last known value.
    pub async fn read(&self, raw: Option<&Value>) -> Result<Option<UnifiedAsset>, BindError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let stored = field_value::decode(raw)
            .inspect_err(|e| tracing::warn!(error = %e, "Ignoring unreadable field value"))?;
        Ok(Some(self.resolve(stored).await))
    }

    /// The field's current asset, if readable.
    pub async fn current(&self) -> Option<UnifiedAsset> {
        self.read(self.host.field_value().as_ref())
            .await
            .ok()
            .flatten()
    }

    /// Call `on_change` for every later change of the field, in order.
    ///
    /// Unreadable values are skipped. Dropping the returned
    /// [`Subscription`] unsubscribes.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(Option<UnifiedAsset>) + Send + Sync + 'static,
    {
        let on_change = Arc::new(on_change);
        let binder = self.clone();
        Subscription::spawn(self.host.field_changes(), move |change: FieldChange| {
            let binder = binder.clone();
            let on_change = Arc::clone(&on_change);
            async move {
                if let Ok(value) = binder.read(change.value.as_ref()).await {
                    on_change(value);
                }
            }
        })
    }
}
