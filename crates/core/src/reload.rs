//! Which recovery action to offer for an asset that has no preview yet.

use serde::Serialize;

use crate::asset::UnifiedAsset;

/// Failed reloads after which the editor is offered instead of reload.
pub const DEFAULT_RELOAD_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadAffordance {
    /// The asset is previewable, or not a native asset.
    None,
    /// Offer "Reload to view media".
    Reload,
    /// Offer "Edit media" in the host asset editor.
    OpenEditor,
}

/// UI policy for un-previewable native assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadPolicy {
    pub threshold: u32,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RELOAD_THRESHOLD,
        }
    }
}

impl ReloadPolicy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Affordance for `asset` after `attempts` caller-tracked reloads.
    pub fn affordance(&self, asset: &UnifiedAsset, attempts: u32) -> ReloadAffordance {
        if asset.native_id().is_none() || asset.is_previewable() {
            return ReloadAffordance::None;
        }
        if attempts < self.threshold {
            ReloadAffordance::Reload
        } else {
            ReloadAffordance::OpenEditor
        }
    }
}
