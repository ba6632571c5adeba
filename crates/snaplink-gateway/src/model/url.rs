use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snaplink_core::UrlMapping;

/// Body of `POST /shorten` and `PUT /shorten/{code}`.
///
/// `url` is kept as a raw JSON value so a missing field, a non-string and an
/// empty string are all told apart from a usable url by [`UrlPayload::into_url`].
#[derive(Debug, Deserialize)]
pub struct UrlPayload {
    #[serde(default)]
    pub url: Option<Value>,
}

impl UrlPayload {
    /// Returns the url if it is a non-empty string.
    pub fn into_url(self) -> Option<String> {
        match self.url {
            Some(Value::String(url)) if !url.is_empty() => Some(url),
            _ => None,
        }
    }
}

/// Full record, returned on creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResponse {
    pub id: u64,
    pub url: String,
    pub short_code: String,
    pub count: Option<u64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UrlMapping> for MappingResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            id: mapping.id,
            url: mapping.url,
            short_code: mapping.short_code.into(),
            count: mapping.count,
            created_at: mapping.created_at,
            updated_at: mapping.updated_at,
        }
    }
}

/// Record without the access counter, returned by retrieve and update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingView {
    pub id: u64,
    pub url: String,
    pub short_code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UrlMapping> for MappingView {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            id: mapping.id,
            url: mapping.url,
            short_code: mapping.short_code.into(),
            created_at: mapping.created_at,
            updated_at: mapping.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub id: u64,
    pub url: String,
    pub short_code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub access_count: u64,
}

impl From<UrlMapping> for StatsResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            access_count: mapping.access_count(),
            id: mapping.id,
            url: mapping.url,
            short_code: mapping.short_code.into(),
            created_at: mapping.created_at,
            updated_at: mapping.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}
