//! Lifecycle state of a field's asset binding.

use serde::Serialize;

use crate::types::AssetId;

/// Where a field session stands with respect to its asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum AssetBindingState {
    /// Nothing in flight; the field may or may not hold a value.
    #[default]
    Idle,
    /// Waiting for a freshly created native asset to be processed.
    Polling { asset_id: AssetId },
    /// The field holds an asset that was resolved by this session.
    Bound,
    /// The last action failed; the field keeps its previous value.
    Failed { message: String },
}

/// Inputs that move an [`AssetBindingState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingEvent {
    PollStarted(AssetId),
    Resolved,
    Cleared,
    Failed(String),
    /// An in-flight action was superseded or torn down.
    Abandoned,
}

impl AssetBindingState {
    /// Apply `event` and return the next state.
    ///
    /// `Abandoned` only leaves `Polling` (back to `Idle`); in any other
    /// state a newer action already owns the state.
    pub fn apply(self, event: BindingEvent) -> Self {
        match (self, event) {
            (_, BindingEvent::PollStarted(asset_id)) => Self::Polling { asset_id },
            (_, BindingEvent::Resolved) => Self::Bound,
            (_, BindingEvent::Cleared) => Self::Idle,
            (_, BindingEvent::Failed(message)) => Self::Failed { message },
            (Self::Polling { .. }, BindingEvent::Abandoned) => Self::Idle,
            (state, BindingEvent::Abandoned) => state,
        }
    }

    /// Whether a spinner should be shown.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Polling { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Polling { .. } => "polling",
            Self::Bound => "bound",
            Self::Failed { .. } => "failed",
        }
    }
}
