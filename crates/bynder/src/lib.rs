//! Brand-portal (Bynder) media search client.
//!
//! Provides the HTTP search wrapper, normalization of the portal's
//! inconsistent media records, failure classification with user-facing
//! messages, and the paged search dialog session that hands a single
//! selection back to the field.

pub mod api;
pub mod dialog;
pub mod records;

pub use api::{BynderApi, MediaSearch, SearchError, SearchFailure, SearchPage, SearchQuery};
pub use dialog::{DialogReturn, SearchDialog, SearchStatus};
