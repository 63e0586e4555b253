//! Asset shapes shared by the search client, the binder and the field
//! session.
//!
//! [`UnifiedAsset`] is the single value written to a content field,
//! whichever source the asset came from. [`HostAsset`] mirrors the host
//! platform's asset document and [`SearchResult`] is the normalized
//! record produced by the external search client.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::AssetId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Title used for native assets that have no title in the field locale.
pub const DEFAULT_NATIVE_TITLE: &str = "Untitled Asset";

/// Title used for external assets whose record carries no name.
pub const DEFAULT_EXTERNAL_TITLE: &str = "Bynder Asset";

/// Image shown in search results that have no thumbnail.
pub const PLACEHOLDER_THUMBNAIL_URL: &str = "https://via.placeholder.com/150?text=No+Thumbnail";

// ---------------------------------------------------------------------------
// AssetKind
// ---------------------------------------------------------------------------

/// Which system owns an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// File-backed asset managed by the host content platform.
    Native,
    /// Image managed by the external asset-management service.
    External,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::External => "external",
        }
    }
}

// ---------------------------------------------------------------------------
// UnifiedAsset
// ---------------------------------------------------------------------------

/// The value stored in a content field.
///
/// Serialized with an internal `type` tag:
///
/// ```json
/// {"type": "native", "id": "5KsDBWseXY6QegucYAoacS", "title": "Logo",
///  "thumbnailUrl": "https://...", "sourceUrl": "https://..."}
/// ```
///
/// Only native assets carry an `id`; only native assets support the
/// reload and open-editor actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UnifiedAsset {
    #[serde(rename_all = "camelCase")]
    Native {
        id: AssetId,
        title: String,
        thumbnail_url: String,
        source_url: String,
    },
    #[serde(rename_all = "camelCase")]
    External {
        title: String,
        thumbnail_url: String,
        source_url: String,
    },
}

impl UnifiedAsset {
    /// Build a native asset from a host asset document.
    ///
    /// Missing titles fall back to [`DEFAULT_NATIVE_TITLE`]; an
    /// unprocessed file yields empty URLs.
    pub fn from_host_asset(asset: &HostAsset, locale: &str) -> Self {
        let url = asset.file_url(locale).unwrap_or_default();
        Self::Native {
            id: asset.sys.id.clone(),
            title: asset
                .title(locale)
                .unwrap_or(DEFAULT_NATIVE_TITLE)
                .to_string(),
            thumbnail_url: url.clone(),
            source_url: url,
        }
    }

    /// A native reference whose asset document could not be read yet.
    pub fn unresolved_native(id: impl Into<AssetId>) -> Self {
        Self::Native {
            id: id.into(),
            title: DEFAULT_NATIVE_TITLE.to_string(),
            thumbnail_url: String::new(),
            source_url: String::new(),
        }
    }

    /// Build an external asset from a normalized search record.
    pub fn from_search_result(result: &SearchResult) -> Self {
        let title = if result.name.trim().is_empty() {
            DEFAULT_EXTERNAL_TITLE.to_string()
        } else {
            result.name.clone()
        };
        Self::External {
            title,
            thumbnail_url: result.thumbnail_url.clone(),
            source_url: result.source_url.clone(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Native { .. } => AssetKind::Native,
            Self::External { .. } => AssetKind::External,
        }
    }

    /// Host asset id, present only for native assets.
    pub fn native_id(&self) -> Option<&str> {
        match self {
            Self::Native { id, .. } => Some(id),
            Self::External { .. } => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Native { title, .. } | Self::External { title, .. } => title,
        }
    }

    pub fn thumbnail_url(&self) -> &str {
        match self {
            Self::Native { thumbnail_url, .. } | Self::External { thumbnail_url, .. } => {
                thumbnail_url
            }
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            Self::Native { source_url, .. } | Self::External { source_url, .. } => source_url,
        }
    }

    /// Whether the asset has an image that can be rendered.
    pub fn is_previewable(&self) -> bool {
        !self.thumbnail_url().is_empty()
    }
}

// ---------------------------------------------------------------------------
// SearchResult
// ---------------------------------------------------------------------------

/// A normalized record from the external asset search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub thumbnail_url: String,
    pub source_url: String,
}

impl SearchResult {
    /// Thumbnail to display in a result grid.
    pub fn display_thumbnail(&self) -> &str {
        if self.thumbnail_url.is_empty() {
            PLACEHOLDER_THUMBNAIL_URL
        } else {
            &self.thumbnail_url
        }
    }
}

// ---------------------------------------------------------------------------
// HostAsset
// ---------------------------------------------------------------------------

/// Asset document as returned by the host content API.
///
/// Field values are keyed by locale code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostAsset {
    pub sys: AssetSys,
    #[serde(default)]
    pub fields: AssetFields,
}

/// System metadata of a host asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSys {
    pub id: AssetId,
    #[serde(default)]
    pub version: u64,
    /// Set once the asset has been published at least once.
    #[serde(default)]
    pub published_version: Option<u64>,
}

/// Localized content fields of a host asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetFields {
    #[serde(default)]
    pub title: HashMap<String, String>,
    #[serde(default)]
    pub file: HashMap<String, AssetFile>,
}

/// Binary file descriptor. `url` stays empty until the upload has been
/// processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl HostAsset {
    /// Title in `locale`, ignoring blank values.
    pub fn title(&self, locale: &str) -> Option<&str> {
        self.fields
            .title
            .get(locale)
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    /// Absolute URL of the processed file in `locale`, if any.
    pub fn file_url(&self, locale: &str) -> Option<String> {
        self.fields
            .file
            .get(locale)
            .and_then(|f| f.url.as_deref())
            .filter(|u| !u.is_empty())
            .map(normalize_asset_url)
    }

    pub fn is_published(&self) -> bool {
        self.sys.published_version.is_some()
    }
}

/// Turn a protocol-relative asset URL (`//host/path`) into an `https:` URL.
/// Absolute URLs are returned unchanged.
pub fn normalize_asset_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn host_asset(title: Option<&str>, url: Option<&str>) -> HostAsset {
        let mut fields = AssetFields::default();
        if let Some(t) = title {
            fields.title.insert("en-US".to_string(), t.to_string());
        }
        fields.file.insert(
            "en-US".to_string(),
            AssetFile {
                url: url.map(str::to_string),
                file_name: Some("logo.png".to_string()),
                content_type: Some("image/png".to_string()),
            },
        );
        HostAsset {
            sys: AssetSys {
                id: "asset-1".to_string(),
                version: 1,
                published_version: None,
            },
            fields,
        }
    }

    #[test]
    fn native_serializes_with_type_tag_and_camel_case() {
        let asset = UnifiedAsset::Native {
            id: "a1".to_string(),
            title: "Logo".to_string(),
            thumbnail_url: "https://img/logo.png".to_string(),
            source_url: "https://img/logo.png".to_string(),
        };
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "native");
        assert_eq!(json["id"], "a1");
        assert_eq!(json["thumbnailUrl"], "https://img/logo.png");
        assert_eq!(json["sourceUrl"], "https://img/logo.png");
    }

    #[test]
    fn external_has_no_id() {
        let asset = UnifiedAsset::External {
            title: "Banner".to_string(),
            thumbnail_url: "https://dam/t.jpg".to_string(),
            source_url: "https://dam/o.jpg".to_string(),
        };
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "external");
        assert!(json.get("id").is_none());
        assert_eq!(asset.native_id(), None);
    }

    #[test]
    fn from_host_asset_prefixes_protocol_relative_url() {
        let asset = host_asset(Some("Logo"), Some("//images.example.net/logo.png"));
        let unified = UnifiedAsset::from_host_asset(&asset, "en-US");
        assert_eq!(unified.title(), "Logo");
        assert_eq!(unified.thumbnail_url(), "https://images.example.net/logo.png");
        assert_eq!(unified.source_url(), "https://images.example.net/logo.png");
        assert_eq!(unified.native_id(), Some("asset-1"));
    }

    #[test]
    fn from_host_asset_falls_back_to_default_title() {
        let asset = host_asset(None, None);
        let unified = UnifiedAsset::from_host_asset(&asset, "en-US");
        assert_eq!(unified.title(), DEFAULT_NATIVE_TITLE);
        assert!(!unified.is_previewable());
    }

    #[test]
    fn from_host_asset_uses_field_locale_only() {
        let asset = host_asset(Some("Logo"), Some("//images.example.net/logo.png"));
        let unified = UnifiedAsset::from_host_asset(&asset, "de-DE");
        assert_eq!(unified.title(), DEFAULT_NATIVE_TITLE);
        assert_eq!(unified.thumbnail_url(), "");
    }

    #[test]
    fn from_search_result_defaults_blank_name() {
        let result = SearchResult {
            id: "b1".to_string(),
            name: "  ".to_string(),
            thumbnail_url: "https://dam/t.jpg".to_string(),
            source_url: "https://dam/o.jpg".to_string(),
        };
        let unified = UnifiedAsset::from_search_result(&result);
        assert_eq!(unified.kind(), AssetKind::External);
        assert_eq!(unified.title(), DEFAULT_EXTERNAL_TITLE);
        assert_eq!(unified.source_url(), "https://dam/o.jpg");
    }

    #[test]
    fn display_thumbnail_uses_placeholder() {
        let result = SearchResult {
            id: "b1".to_string(),
            name: "x".to_string(),
            thumbnail_url: String::new(),
            source_url: String::new(),
        };
        assert_eq!(result.display_thumbnail(), PLACEHOLDER_THUMBNAIL_URL);
    }

    #[test]
    fn normalize_keeps_absolute_urls() {
        assert_eq!(normalize_asset_url("https://a/b.png"), "https://a/b.png");
        assert_eq!(normalize_asset_url("//a/b.png"), "https://a/b.png");
    }

    #[test]
    fn host_asset_deserializes_from_api_shape() {
        let json = serde_json::json!({
            "sys": {"id": "x1", "version": 3, "publishedVersion": 2},
            "fields": {
                "title": {"en-US": "Hero"},
                "file": {"en-US": {"url": "//img/hero.jpg", "fileName": "hero.jpg", "contentType": "image/jpeg"}}
            }
        });
        let asset: HostAsset = serde_json::from_value(json).unwrap();
        assert!(asset.is_published());
        assert_eq!(asset.file_url("en-US").as_deref(), Some("https://img/hero.jpg"));
    }
}
