//! The asset field: binding assets into the field value, waiting for
//! newly created assets to be processed, and the session that drives
//! the field's editor actions.

pub mod binder;
pub mod readiness;
pub mod session;

pub use binder::{AssetBinder, BindError};
pub use readiness::{await_ready, PollConfig, ReadinessError, ReadinessRequirement};
pub use session::{ActionOutcome, FieldSession, Preview};
