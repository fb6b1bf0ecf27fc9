use crate::error::Result;
use crate::model::{ShortenRequest, UrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use super::path_code;
use burrow_shortener::ShortenParams;

/// `POST /shorten`
pub async fn shorten_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlResponse>)> {
    let Json(request) = request?;
    let params = ShortenParams {
        long_url: request.long_url,
        custom_alias: request.custom_alias,
    };

    let record = state.shortener().shorten(params).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// `GET /{code}`
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Redirect> {
    let code = path_code(code)?;
    let resolved = state.redirector().resolve(&code).await?;
    Ok(Redirect::temporary(&resolved.long_url))
}
