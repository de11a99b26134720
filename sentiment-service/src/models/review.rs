//! Review record and its star rating.

use sqlx::FromRow;
use std::fmt;

/// Longest review text the `history.review` column holds.
pub const MAX_REVIEW_CHARS: u64 = 1000;

/// A sentiment label, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: Rating = Rating(1);
    pub const MAX: Rating = Rating(5);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Rating for a zero-based class index, as emitted by `LABEL_k` heads.
    pub fn from_class_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok()?.checked_add(1).and_then(Self::new)
    }
}

impl TryFrom<i64> for Rating {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value).ok().and_then(Rating::new).ok_or(value)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the `history` table.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct ReviewRecord {
    pub id: i64,
    pub rating: i64,
    pub review: Option<String>,
}
