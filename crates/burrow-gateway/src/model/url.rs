use burrow_core::UrlRecord;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Body of `POST /shorten`.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(rename = "longUrl")]
    pub long_url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    pub short_url: String,
    pub long_url: String,
    pub created_at: Timestamp,
}

impl From<UrlRecord> for UrlResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_url: record.short_code.to_string(),
            long_url: record.long_url,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub short_url: String,
    pub long_url: String,
    pub created_at: Timestamp,
    pub clicks: u64,
    pub last_accessed: Option<Timestamp>,
}

impl From<UrlRecord> for StatsResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_url: record.short_code.to_string(),
            long_url: record.long_url,
            created_at: record.created_at,
            clicks: record.clicks,
            last_accessed: record.last_accessed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
