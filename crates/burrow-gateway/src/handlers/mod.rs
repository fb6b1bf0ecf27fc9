mod health;
mod stats;
mod url;

pub use health::health_handler;
pub use stats::stats_handler;
pub use url::{redirect_handler, shorten_handler};

use crate::error::{AppError, Result};
use burrow_core::shortcode::MAX_LENGTH;
use burrow_core::ShortCode;

/// Parses a short code taken from a request path.
///
/// Only an over-long segment is a client error. Any other segment that
/// cannot be a short code simply does not exist.
fn path_code(raw: String) -> Result<ShortCode> {
    if raw.len() > MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "short code must be at most {MAX_LENGTH} characters, got {}",
            raw.len()
        )));
    }

    ShortCode::new(raw.as_str())
        .map_err(|_| AppError::NotFound(format!("short code '{raw}' not found")))
}
