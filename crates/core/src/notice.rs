//! User-facing notifications raised through the host notifier.

use serde::Serialize;

pub const MSG_NATIVE_FETCH_FAILED: &str = "Unable to fetch CMS asset.";
pub const MSG_NEW_ASSET_FAILED: &str = "Failed to upload or fetch the new asset.";
pub const MSG_NEW_ASSET_NOT_READY: &str = "Asset created, but it is not ready yet. Try reloading.";
pub const MSG_NO_EXTERNAL_SELECTION: &str = "No image selected from Brand Portal.";
pub const MSG_FIELD_WRITE_FAILED: &str = "Unable to update the field.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A non-fatal message shown to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
