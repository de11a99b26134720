pub mod reviews;

pub use reviews::{DeleteResponse, HistoryItem, ScoreRequest};
