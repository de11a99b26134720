//! Scoring, history and deletion of reviews.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{DeleteResponse, HistoryItem, ScoreRequest},
    services::metrics::{record_model_error, record_prediction},
    startup::AppState,
};

/// Score `text`, store it with its rating, and answer the rating as a bare
/// JSON string (`"1"`..`"5"`).
///
/// Nothing is stored when the model call fails.
pub async fn score_review(
    State(state): State<AppState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    tracing::info!(
        model = state.model.name(),
        text_len = request.text.len(),
        "Scoring review"
    );

    let rating = state.model.classify(&request.text).await.map_err(|e| {
        tracing::warn!(error = %e, "Sentiment model call failed");
        record_model_error(e.kind());
        AppError::from(e)
    })?;

    let record = state.db.create_review(rating, &request.text).await?;
    record_prediction(rating);

    tracing::info!(review_id = record.id, rating = %rating, "Review scored");

    Ok(Json(rating.to_string()))
}

/// Every stored review, ordered by id.
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryItem>>, AppError> {
    let records = state.db.list_reviews().await?;
    Ok(Json(records.into_iter().map(HistoryItem::from).collect()))
}

/// Delete one review. A missing or non-numeric id is `404 {"error": "Not found"}`.
pub async fn delete_review(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let not_found = || AppError::NotFound(anyhow::anyhow!("Not found"));

    let Path(id) = id.map_err(|_| not_found())?;

    if !state.db.delete_review(id).await? {
        tracing::info!(review_id = id, "Delete requested for unknown review");
        return Err(not_found());
    }

    Ok(Json(DeleteResponse { success: true }))
}
