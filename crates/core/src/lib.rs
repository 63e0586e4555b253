//! Domain model for the brand-asset field extension.
//!
//! Holds the unified asset shape written to content fields, the host
//! platform's asset representation, stored-value decoding, the binding
//! state machine and the reload policy. Nothing in this crate performs
//! I/O; the host platform is reached through the [`host::ContentHost`]
//! trait and time through [`clock::Clock`].

pub mod actions;
pub mod asset;
pub mod clock;
pub mod config;
pub mod error;
pub mod field_value;
pub mod host;
pub mod notice;
pub mod reload;
pub mod state;
pub mod types;

pub use asset::{AssetKind, HostAsset, SearchResult, UnifiedAsset};
pub use error::CoreError;
pub use field_value::{FieldChange, StoredValue};
pub use host::{ContentHost, HostError};
pub use state::AssetBindingState;
