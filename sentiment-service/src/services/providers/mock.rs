//! Mock model for tests and offline development.

use super::{ModelError, SentimentModel};
use crate::models::Rating;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

const POSITIVE_WORDS: &[&str] = &["good", "great", "love", "excellent", "amazing", "best"];
const NEGATIVE_WORDS: &[&str] = &["bad", "awful", "hate", "terrible", "worst", "broken"];

enum Mode {
    Fixed(Rating),
    Keyword,
    Unavailable,
}

pub struct MockSentimentModel {
    mode: Mode,
    calls: AtomicUsize,
}

impl MockSentimentModel {
    /// Always answers `rating`.
    pub fn fixed(rating: Rating) -> Self {
        Self::with_mode(Mode::Fixed(rating))
    }

    /// Crude lexicon scoring: 3 plus positive hits minus negative hits, clamped.
    pub fn keyword() -> Self {
        Self::with_mode(Mode::Keyword)
    }

    /// Fails every call as if the model endpoint were down.
    pub fn unavailable() -> Self {
        Self::with_mode(Mode::Unavailable)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn keyword_rating(text: &str) -> Rating {
    let lowered = text.to_lowercase();
    let hits = |words: &[&str]| words.iter().filter(|w| lowered.contains(*w)).count() as i64;
    let score = (3 + hits(POSITIVE_WORDS) - hits(NEGATIVE_WORDS)).clamp(1, 5);
    Rating::try_from(score).unwrap_or(Rating::MIN)
}

#[async_trait]
impl SentimentModel for MockSentimentModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, text: &str) -> Result<Rating, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.mode {
            Mode::Fixed(rating) => Ok(rating),
            Mode::Keyword => Ok(keyword_rating(text)),
            Mode::Unavailable => Err(ModelError::Unavailable(
                "mock model is unavailable".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<(), ModelError> {
        match self.mode {
            Mode::Unavailable => Err(ModelError::Unavailable(
                "mock model is unavailable".to_string(),
            )),
            Mode::Fixed(_) | Mode::Keyword => Ok(()),
        }
    }
}
