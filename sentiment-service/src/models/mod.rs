//! Domain models for sentiment-service.

mod review;

pub use review::{Rating, ReviewRecord, MAX_REVIEW_CHARS};
