//! The host content platform, as seen from one field of one entry.
//!
//! Implementations bridge to the platform's content-management API and
//! editor UI. Every call is asynchronous; pickers return `None` when the
//! editor cancels them.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::asset::{HostAsset, SearchResult};
use crate::field_value::FieldChange;
use crate::notice::Notice;
use crate::types::AssetId;

/// Errors from the host content API.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The requested asset does not exist (or is not visible).
    #[error("Asset not found: {0}")]
    NotFound(AssetId),

    /// The host rejected or failed the request.
    #[error("Host request failed: {0}")]
    Request(String),

    /// The host session has gone away.
    #[error("Host session closed")]
    Closed,
}

#[async_trait]
pub trait ContentHost: Send + Sync {
    /// Locale of the field being edited.
    fn locale(&self) -> &str;

    /// Fetch a native asset document by id.
    async fn get_asset(&self, id: &str) -> Result<HostAsset, HostError>;

    /// Current raw value of the field.
    fn field_value(&self) -> Option<Value>;

    /// Replace the field's value.
    async fn set_field_value(&self, value: Value) -> Result<(), HostError>;

    /// Clear the field.
    async fn remove_field_value(&self) -> Result<(), HostError>;

    /// Receive every subsequent change of the field's value.
    fn field_changes(&self) -> broadcast::Receiver<FieldChange>;

    /// Open the asset editor and wait until the editor closes it.
    async fn open_asset_editor(&self, id: &str) -> Result<(), HostError>;

    /// Run the host's "new asset" flow; returns the created asset's id.
    async fn create_asset_flow(&self) -> Result<Option<AssetId>, HostError>;

    /// Let the editor pick an existing native asset.
    async fn select_asset_dialog(&self) -> Result<Option<AssetId>, HostError>;

    /// Open the external search dialog and wait for its selection.
    async fn open_search_dialog(&self) -> Result<Option<SearchResult>, HostError>;

    /// Show a notification to the editor.
    fn notify(&self, notice: Notice);
}
