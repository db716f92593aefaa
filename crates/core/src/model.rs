//! Vocabulary Entities
//!
//! Typed records for the three persisted entities: users, shared word pairs,
//! and the per-user vocabulary entries that join them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal, stable identifier of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Identifier of a shared word pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user known to the bot, keyed by the transport-provided identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_id: i64,
    pub display_name: String,
}

/// A de-duplicated `(native, target)` pair.
///
/// Both terms are stored normalized (see [`normalize_term`]). Common words are
/// seeded at startup and enrolled into every new user's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub native_term: String,
    pub target_term: String,
    pub is_common: bool,
}

/// The fact that a user has a word in their list, with mastery counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub user_id: UserId,
    pub word_id: WordId,
    pub attempt_count: i32,
    pub correct_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A word as shown in a user's list, joined with that user's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word_id: WordId,
    pub native_term: String,
    pub target_term: String,
    pub attempt_count: i32,
    pub correct_count: i32,
}

/// Result of [`crate::store::VocabularyStore::ensure_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsuredUser {
    pub id: UserId,
    /// True when this call created the user (and enrolled the common words).
    pub is_new: bool,
}

/// Result of [`crate::store::VocabularyStore::add_word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedWord {
    pub word_id: WordId,
    /// The user's vocabulary size after the call.
    pub total_words: i64,
}

/// Counters of a vocabulary entry after a quiz attempt was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub attempt_count: i32,
    pub correct_count: i32,
}

/// Trims and lowercases a term the way every stored term is normalized.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}
