mod url;

pub use url::{ErrorResponse, HealthResponse, ShortenRequest, StatsResponse, UrlResponse};
