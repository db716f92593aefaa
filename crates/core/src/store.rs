//! Vocabulary Storage Contract
//!
//! This module defines the persistence seam of the core. The PostgreSQL
//! service and the in-memory development store both implement
//! [`VocabularyStore`], so the quiz engine and the conversation state machine
//! never see a concrete database.

use crate::error::Result;
use crate::model::{AddedWord, EnsuredUser, Progress, UserId, VocabularyItem, WordId};
use async_trait::async_trait;

/// A common word pair loaded into the store at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPair {
    pub native: &'static str,
    pub target: &'static str,
}

/// The combined user, word and vocabulary-association repository.
///
/// Every operation is atomic on its own: implementations must keep
/// `add_word` and `ensure_user` free of duplicate rows when several callers
/// race on the same word or user. Failures are reported as
/// [`crate::Error::StorageUnavailable`] and are never retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Inserts the given pairs as common words when the store holds none yet.
    ///
    /// Returns how many pairs were inserted; `0` means the store was already
    /// seeded and nothing changed.
    async fn seed_common_words(&self, pairs: &[SeedPair]) -> Result<usize>;

    /// Looks up a user by external identity, creating it when absent.
    ///
    /// A newly created user is enrolled into every common word within the same
    /// logical operation. Calling this twice never duplicates the user or its
    /// common-word entries.
    async fn ensure_user(&self, external_id: i64, display_name: &str) -> Result<EnsuredUser>;

    /// Returns the internal id of a known user. Never creates one.
    async fn lookup_user(&self, external_id: i64) -> Result<Option<UserId>>;

    /// Adds a pair to the user's vocabulary, creating the shared word if needed.
    ///
    /// Both terms are normalized before lookup. Adding a pair the user already
    /// owns is a no-op that still reports the current total.
    async fn add_word(&self, user_id: UserId, native_term: &str, target_term: &str)
    -> Result<AddedWord>;

    /// Removes the user's association to a word. The shared word row is kept.
    ///
    /// Returns `false` when the user did not have the word.
    async fn remove_word(&self, user_id: UserId, word_id: WordId) -> Result<bool>;

    /// Lists the user's words in a stable order (oldest association first).
    async fn list_words(&self, user_id: UserId) -> Result<Vec<VocabularyItem>>;

    /// Draws up to `limit` distinct target terms uniformly at random from the
    /// global word pool, skipping `exclude_word` and any term in `exclude_terms`.
    async fn sample_target_terms(
        &self,
        exclude_word: WordId,
        exclude_terms: &[String],
        limit: usize,
    ) -> Result<Vec<String>>;

    /// Atomically bumps `attempt_count`, and `correct_count` when `correct`.
    ///
    /// Returns the updated counters, or `None` when the association no longer
    /// exists (the word was removed while its question was pending).
    async fn record_attempt(
        &self,
        user_id: UserId,
        word_id: WordId,
        correct: bool,
    ) -> Result<Option<Progress>>;
}
