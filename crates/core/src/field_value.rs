//! Encoding and decoding of the raw JSON held by a content field.
//!
//! New writes always use the tagged [`UnifiedAsset`] shape. Fields edited
//! by earlier versions of the extension may still hold a bare asset id,
//! a bare external URL, a host link object, or the older
//! `{"type": "cms" | "bynder", ...}` object; [`decode`] accepts all of
//! them so callers only ever see a [`StoredValue`].

use serde::Deserialize;
use serde_json::Value;

use crate::asset::{UnifiedAsset, DEFAULT_EXTERNAL_TITLE, DEFAULT_NATIVE_TITLE};
use crate::error::CoreError;
use crate::types::{AssetId, Timestamp};

/// A field value as understood by the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    /// A complete asset snapshot.
    Asset(UnifiedAsset),
    /// A reference to a native asset that must be fetched to be shown.
    NativeLink(AssetId),
}

/// Notification that a field's value changed, locally or in another
/// editing session. `value` is `None` when the field was cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub value: Option<Value>,
    pub changed_at: Timestamp,
}

impl FieldChange {
    pub fn set(value: Value) -> Self {
        Self {
            value: Some(value),
            changed_at: chrono::Utc::now(),
        }
    }

    pub fn cleared() -> Self {
        Self {
            value: None,
            changed_at: chrono::Utc::now(),
        }
    }
}

/// Serialize an asset into the field's JSON representation.
pub fn encode(asset: &UnifiedAsset) -> Value {
    // UnifiedAsset only holds strings, serialization cannot fail.
    serde_json::to_value(asset).unwrap_or(Value::Null)
}

/// Decode a raw field value into a [`StoredValue`].
pub fn decode(value: &Value) -> Result<StoredValue, CoreError> {
    match value {
        Value::String(s) => decode_string(s),
        Value::Object(map) => {
            if let Some(link) = map.get("sys") {
                return decode_link(link);
            }
            match map.get("type").and_then(Value::as_str) {
                Some("native") | Some("external") => serde_json::from_value(value.clone())
                    .map(StoredValue::Asset)
                    .map_err(|e| CoreError::FieldValue(format!("Malformed asset value: {e}"))),
                Some("cms") | Some("bynder") => decode_previous_shape(value),
                Some(other) => Err(CoreError::FieldValue(format!(
                    "Unknown asset type '{other}'"
                ))),
                None => Err(CoreError::FieldValue(
                    "Field object has no asset type".to_string(),
                )),
            }
        }
        other => Err(CoreError::FieldValue(format!(
            "Unsupported field value: {other}"
        ))),
    }
}

fn decode_string(s: &str) -> Result<StoredValue, CoreError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CoreError::FieldValue("Empty field value".to_string()));
    }
    if s.starts_with("http://") || s.starts_with("https://") {
        return Ok(StoredValue::Asset(UnifiedAsset::External {
            title: DEFAULT_EXTERNAL_TITLE.to_string(),
            thumbnail_url: s.to_string(),
            source_url: s.to_string(),
        }));
    }
    Ok(StoredValue::NativeLink(s.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkSys {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    link_type: Option<String>,
    id: String,
}

fn decode_link(sys: &Value) -> Result<StoredValue, CoreError> {
    let link: LinkSys = serde_json::from_value(sys.clone())
        .map_err(|e| CoreError::FieldValue(format!("Malformed link value: {e}")))?;
    if link.kind != "Link" || link.link_type.as_deref() != Some("Asset") {
        return Err(CoreError::FieldValue(format!(
            "Link is not an asset link: {}/{}",
            link.kind,
            link.link_type.unwrap_or_default()
        )));
    }
    Ok(StoredValue::NativeLink(link.id))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviousShape {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    original_url: Option<String>,
}

fn decode_previous_shape(value: &Value) -> Result<StoredValue, CoreError> {
    let prev: PreviousShape = serde_json::from_value(value.clone())
        .map_err(|e| CoreError::FieldValue(format!("Malformed asset value: {e}")))?;
    let thumbnail_url = prev.thumbnail.unwrap_or_default();
    let source_url = prev.original_url.unwrap_or_default();

    if prev.kind == "cms" {
        let id = prev
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CoreError::FieldValue("Native asset value has no id".to_string()))?;
        return Ok(StoredValue::Asset(UnifiedAsset::Native {
            id,
            title: prev
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_NATIVE_TITLE.to_string()),
            thumbnail_url,
            source_url,
        }));
    }

    Ok(StoredValue::Asset(UnifiedAsset::External {
        title: prev
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTERNAL_TITLE.to_string()),
        thumbnail_url,
        source_url,
    }))
}
