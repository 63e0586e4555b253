//! Raw media records returned by the portal and their normalization.
//!
//! The media endpoint is not consistent about where it puts the web
//! thumbnail: some records carry `thumbnails.webimage`, others only
//! `derivatives.webImage.url`. It also answers either with a bare array
//! or with `{"media": [...]}` depending on the request flags.

use brandlink_core::SearchResult;
use serde::Deserialize;

/// Body of a media search response.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MediaResponse {
    List(Vec<MediaRecord>),
    Wrapped { media: Vec<MediaRecord> },
}

impl MediaResponse {
    pub fn into_records(self) -> Vec<MediaRecord> {
        match self {
            Self::List(records) | Self::Wrapped { media: records } => records,
        }
    }
}

/// One media item as sent by the portal. Only the fields we use are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
    #[serde(default)]
    pub derivatives: Option<Derivatives>,
    #[serde(default)]
    pub original_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub webimage: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Derivatives {
    #[serde(default, rename = "webImage")]
    pub web_image: Option<Derivative>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Derivative {
    #[serde(default)]
    pub url: Option<String>,
}

impl MediaRecord {
    /// Thumbnail URL: direct thumbnail first, then the web-image
    /// derivative, else empty.
    pub fn thumbnail_url(&self) -> &str {
        let direct = self
            .thumbnails
            .as_ref()
            .and_then(|t| non_empty(t.webimage.as_deref()));
        let derivative = || {
            self.derivatives
                .as_ref()
                .and_then(|d| d.web_image.as_ref())
                .and_then(|w| non_empty(w.url.as_deref()))
        };
        direct.or_else(derivative).unwrap_or("")
    }

    pub fn normalize(&self) -> SearchResult {
        SearchResult {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_default(),
            thumbnail_url: self.thumbnail_url().to_string(),
            source_url: self.original_url.clone().unwrap_or_default(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Parse a response body into normalized results.
pub fn parse_results(body: &[u8]) -> Result<Vec<SearchResult>, serde_json::Error> {
    let response: MediaResponse = serde_json::from_slice(body)?;
    Ok(response
        .into_records()
        .iter()
        .map(MediaRecord::normalize)
        .collect())
}
