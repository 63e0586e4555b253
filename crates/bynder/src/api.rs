//! REST client for the portal's media search endpoint.
//!
//! Wraps `GET {domain}/api/v4/media/` using [`reqwest`]. Pages are
//! 1-based; whether more pages exist is decided only by whether the
//! returned page is full.

use async_trait::async_trait;
use brandlink_core::config::BynderConfig;
use brandlink_core::SearchResult;
use serde::Serialize;

use crate::records::parse_results;

/// Path of the media listing endpoint, relative to the portal domain.
pub const MEDIA_PATH: &str = "/api/v4/media/";

/// Media type filter sent with every search.
const MEDIA_TYPE_IMAGE: &str = "image";

// ---------------------------------------------------------------------------
// Query / page
// ---------------------------------------------------------------------------

/// Parameters of a single search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Keyword filter; blank means "all images".
    pub keyword: String,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            keyword: keyword.into(),
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    fn params(&self) -> QueryParams<'_> {
        let keyword = self.keyword.trim();
        QueryParams {
            keyword: (!keyword.is_empty()).then_some(keyword),
            media_type: MEDIA_TYPE_IMAGE,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Serialize)]
struct QueryParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
    #[serde(rename = "type")]
    media_type: &'static str,
    page: u32,
    limit: u32,
}

/// One page of normalized results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub page: u32,
    pub limit: u32,
}

impl SearchPage {
    /// A full page means another page may follow.
    pub fn has_more(&self) -> bool {
        self.results.len() as u32 >= self.limit
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a portal search produced no page.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Talking to the portal failed before a usable answer came back.
    #[error("brand portal unreachable: {0}")]
    Request(#[from] reqwest::Error),

    /// The portal answered, but refused the search.
    #[error("brand portal refused search ({status}): {body}")]
    ApiError {
        /// Status the portal answered with.
        status: u16,
        /// Whatever the portal sent back, kept for the logs.
        body: String,
    },

    /// The body was not a recognizable media listing.
    #[error("Unexpected search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse classification of a search failure, for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// 401 / 403: token or domain is wrong.
    Auth,
    /// 429.
    RateLimited,
    /// 5xx.
    Server,
    /// Transport failures and anything else.
    Other,
}

impl SearchFailure {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            429 => Self::RateLimited,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Auth => {
                "Brand Portal rejected the credentials. Check the API token and domain in the app configuration."
            }
            Self::RateLimited => "Brand Portal rate limit reached. Wait a moment and try again.",
            Self::Server => "Brand Portal is unavailable right now. Try again later.",
            Self::Other => "Searching Brand Portal failed.",
        }
    }
}

impl SearchError {
    pub fn failure(&self) -> SearchFailure {
        match self {
            Self::ApiError { status, .. } => SearchFailure::from_status(*status),
            Self::Request(e) => e
                .status()
                .map(|s| SearchFailure::from_status(s.as_u16()))
                .unwrap_or(SearchFailure::Other),
            Self::Decode(_) => SearchFailure::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// MediaSearch
// ---------------------------------------------------------------------------

/// Anything that can answer a paged media search.
#[async_trait]
pub trait MediaSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError>;
}

// ---------------------------------------------------------------------------
// BynderApi
// ---------------------------------------------------------------------------

/// HTTP client for one portal.
pub struct BynderApi {
    client: reqwest::Client,
    domain: String,
    token: String,
    page_size: u32,
}

impl BynderApi {
    /// Create a client from validated configuration.
    pub fn new(config: &BynderConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &BynderConfig) -> Self {
        Self {
            client,
            domain: config.domain.clone(),
            token: config.token.clone(),
            page_size: config.page_size,
        }
    }

    /// Configured page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Full URL of the media endpoint.
    pub fn media_url(&self) -> String {
        format!("{}{}", self.domain, MEDIA_PATH)
    }

    /// Fetch one page of image results.
    pub async fn search_media(&self, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        tracing::debug!(
            keyword = %query.keyword,
            page = query.page,
            limit = query.limit,
            "Searching brand portal",
        );

        let response = self
            .client
            .get(self.media_url())
            .bearer_auth(&self.token)
            .query(&query.params())
            .send()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Search request failed"))?;

        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        let results = parse_results(&body)?;

        tracing::info!(
            page = query.page,
            count = results.len(),
            "Brand portal search returned",
        );

        Ok(SearchPage {
            results,
            page: query.page,
            limit: query.limit,
        })
    }

    // ---- private helpers ----

    /// Pass accepted searches through; turn refusals into
    /// [`SearchError::ApiError`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Brand portal rejected search");
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl MediaSearch for BynderApi {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        self.search_media(query).await
    }
}
