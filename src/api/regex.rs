use crate::api::AppState;
use crate::api::schemas::regex::{
    MatchResponse, PatternRequest, ShareResponse, SharedRegexResponse, ValidateRequest, ValidateResponse,
};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(body)| body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::BadRequest("Invalid request".into())
    })
}

/// Persists a pattern and sample and returns the id to retrieve them by.
///
/// # Errors
/// Returns `AppError::BadRequest` for a malformed body, `AppError::InvalidPattern` if the
/// pattern does not compile, or a storage error if the share cannot be written.
pub async fn share_regex(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PatternRequest>, JsonRejection>,
) -> Result<Json<ShareResponse>> {
    let req = body(payload)?;
    let share = state.share_service.share(req.pattern, req.test_string).await?;
    Ok(Json(ShareResponse { share_id: share.id }))
}

/// Returns the pattern and sample stored under `id`.
///
/// # Errors
/// Returns `AppError::NotFound` if the share is missing or has expired.
pub async fn get_shared_regex(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SharedRegexResponse>> {
    let share = state.share_service.retrieve(&id).await?;
    Ok(Json(share.into()))
}

/// Reports whether a pattern compiles.
///
/// # Errors
/// Returns `AppError::BadRequest` for a malformed body.
pub async fn validate_regex(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>> {
    let req = body(payload)?;
    Ok(Json(ValidateResponse { is_valid: state.regex_service.validate(&req.pattern) }))
}

/// Runs a pattern against a sample and returns every match.
///
/// # Errors
/// Returns `AppError::BadRequest` for a malformed body or `AppError::InvalidPattern` if the
/// pattern does not compile.
pub async fn match_regex(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PatternRequest>, JsonRejection>,
) -> Result<Json<MatchResponse>> {
    let req = body(payload)?;
    let matches = state.regex_service.find_matches(&req.pattern, &req.test_string)?;
    Ok(Json(MatchResponse { matches }))
}
