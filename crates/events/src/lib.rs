//! Field-change fan-out for the brand-asset field extension.
//!
//! - [`FieldChannel`]: in-process publish/subscribe hub for
//!   [`FieldChange`](brandlink_core::FieldChange)s, backed by
//!   `tokio::sync::broadcast`.
//! - [`Subscription`]: handle to a spawned listener task; dropping it
//!   unsubscribes.

pub mod channel;
pub mod subscription;

pub use channel::FieldChannel;
pub use subscription::Subscription;
