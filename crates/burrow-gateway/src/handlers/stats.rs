use crate::error::{AppError, Result};
use crate::model::StatsResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use super::path_code;

/// `GET /stats/{code}`
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>> {
    let code = path_code(code)?;

    match state.shortener().get(&code).await? {
        Some(record) => Ok(Json(record.into())),
        None => Err(AppError::NotFound(format!("short code '{code}' not found"))),
    }
}
