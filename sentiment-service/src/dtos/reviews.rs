use crate::models::{ReviewRecord, MAX_REVIEW_CHARS};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /result`.
#[derive(Debug, Deserialize, Validate)]
pub struct ScoreRequest {
    #[validate(length(max = MAX_REVIEW_CHARS, message = "Review text is limited to 1000 characters"))]
    pub text: String,
}

/// One entry of `GET /history`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: i64,
    pub text: Option<String>,
    pub rating: i64,
}

impl From<ReviewRecord> for HistoryItem {
    fn from(record: ReviewRecord) -> Self {
        Self {
            id: record.id,
            text: record.review,
            rating: record.rating,
        }
    }
}

/// Body of a successful `DELETE /delete/:id`.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}
