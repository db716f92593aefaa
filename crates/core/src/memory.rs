//! In-Memory Vocabulary Store
//!
//! A `VocabularyStore` kept entirely in process memory. It backs local
//! development (`STORE_BACKEND=memory`) and the core's tests. Every operation
//! runs under one lock, which makes each of them atomic with respect to
//! concurrent callers.

use crate::error::Result;
use crate::model::{
    AddedWord, EnsuredUser, Progress, User, UserId, VocabularyEntry, VocabularyItem, Word, WordId,
    normalize_term,
};
use crate::store::{SeedPair, VocabularyStore};
use async_trait::async_trait;
use chrono::Utc;
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    words: Vec<Word>,
    entries: Vec<VocabularyEntry>,
    last_user_id: i64,
    last_word_id: i64,
}

impl Tables {
    fn find_word(&self, native: &str, target: &str) -> Option<WordId> {
        self.words
            .iter()
            .find(|w| w.native_term == native && w.target_term == target)
            .map(|w| w.id)
    }

    fn insert_word(&mut self, native: String, target: String, is_common: bool) -> WordId {
        self.last_word_id += 1;
        let id = WordId(self.last_word_id);
        self.words.push(Word {
            id,
            native_term: native,
            target_term: target,
            is_common,
        });
        id
    }

    fn has_entry(&self, user_id: UserId, word_id: WordId) -> bool {
        self.entries
            .iter()
            .any(|e| e.user_id == user_id && e.word_id == word_id)
    }

    fn insert_entry(&mut self, user_id: UserId, word_id: WordId) {
        if !self.has_entry(user_id, word_id) {
            self.entries.push(VocabularyEntry {
                user_id,
                word_id,
                attempt_count: 0,
                correct_count: 0,
                created_at: Utc::now(),
            });
        }
    }

    fn count_entries(&self, user_id: UserId) -> i64 {
        self.entries.iter().filter(|e| e.user_id == user_id).count() as i64
    }
}

/// A process-local store. Contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every word row, including ones no user references anymore.
    pub async fn words(&self) -> Vec<Word> {
        self.tables.lock().await.words.clone()
    }

    /// Snapshot of a single vocabulary entry.
    pub async fn entry(&self, user_id: UserId, word_id: WordId) -> Option<VocabularyEntry> {
        self.tables
            .lock()
            .await
            .entries
            .iter()
            .find(|e| e.user_id == user_id && e.word_id == word_id)
            .cloned()
    }

    /// Deletes a user together with its vocabulary entries.
    pub async fn delete_user(&self, user_id: UserId) -> bool {
        let mut tables = self.tables.lock().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != user_id);
        tables.entries.retain(|e| e.user_id != user_id);
        tables.users.len() != before
    }
}

/// Picks up to `limit` distinct items uniformly at random.
fn sample_distinct(pool: BTreeSet<String>, limit: usize) -> Vec<String> {
    let pool: Vec<String> = pool.into_iter().collect();
    let mut rng = rand::rng();
    pool.choose_multiple(&mut rng, limit).cloned().collect()
}

#[async_trait]
impl VocabularyStore for InMemoryStore {
    async fn seed_common_words(&self, pairs: &[SeedPair]) -> Result<usize> {
        let mut tables = self.tables.lock().await;
        if tables.words.iter().any(|w| w.is_common) {
            return Ok(0);
        }
        for pair in pairs {
            let native = normalize_term(pair.native);
            let target = normalize_term(pair.target);
            match tables.find_word(&native, &target) {
                Some(id) => {
                    if let Some(word) = tables.words.iter_mut().find(|w| w.id == id) {
                        word.is_common = true;
                    }
                }
                None => {
                    tables.insert_word(native, target, true);
                }
            }
        }
        Ok(pairs.len())
    }

    async fn ensure_user(&self, external_id: i64, display_name: &str) -> Result<EnsuredUser> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.iter().find(|u| u.external_id == external_id) {
            return Ok(EnsuredUser {
                id: user.id,
                is_new: false,
            });
        }

        tables.last_user_id += 1;
        let id = UserId(tables.last_user_id);
        tables.users.push(User {
            id,
            external_id,
            display_name: display_name.to_string(),
        });
        let common: Vec<WordId> = tables
            .words
            .iter()
            .filter(|w| w.is_common)
            .map(|w| w.id)
            .collect();
        for word_id in common {
            tables.insert_entry(id, word_id);
        }
        Ok(EnsuredUser { id, is_new: true })
    }

    async fn lookup_user(&self, external_id: i64) -> Result<Option<UserId>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .map(|u| u.id))
    }

    async fn add_word(
        &self,
        user_id: UserId,
        native_term: &str,
        target_term: &str,
    ) -> Result<AddedWord> {
        let native = normalize_term(native_term);
        let target = normalize_term(target_term);
        let mut tables = self.tables.lock().await;
        let word_id = match tables.find_word(&native, &target) {
            Some(id) => id,
            None => tables.insert_word(native, target, false),
        };
        tables.insert_entry(user_id, word_id);
        Ok(AddedWord {
            word_id,
            total_words: tables.count_entries(user_id),
        })
    }

    async fn remove_word(&self, user_id: UserId, word_id: WordId) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.entries.len();
        tables
            .entries
            .retain(|e| !(e.user_id == user_id && e.word_id == word_id));
        Ok(tables.entries.len() != before)
    }

    async fn list_words(&self, user_id: UserId) -> Result<Vec<VocabularyItem>> {
        let tables = self.tables.lock().await;
        let items = tables
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter_map(|e| {
                tables
                    .words
                    .iter()
                    .find(|w| w.id == e.word_id)
                    .map(|w| VocabularyItem {
                        word_id: w.id,
                        native_term: w.native_term.clone(),
                        target_term: w.target_term.clone(),
                        attempt_count: e.attempt_count,
                        correct_count: e.correct_count,
                    })
            })
            .collect();
        Ok(items)
    }

    async fn sample_target_terms(
        &self,
        exclude_word: WordId,
        exclude_terms: &[String],
        limit: usize,
    ) -> Result<Vec<String>> {
        let pool: BTreeSet<String> = {
            let tables = self.tables.lock().await;
            tables
                .words
                .iter()
                .filter(|w| w.id != exclude_word)
                .filter(|w| !exclude_terms.iter().any(|t| t == &w.target_term))
                .map(|w| w.target_term.clone())
                .collect()
        };
        Ok(sample_distinct(pool, limit))
    }

    async fn record_attempt(
        &self,
        user_id: UserId,
        word_id: WordId,
        correct: bool,
    ) -> Result<Option<Progress>> {
        let mut tables = self.tables.lock().await;
        let progress = tables
            .entries
            .iter_mut()
            .find(|e| e.user_id == user_id && e.word_id == word_id)
            .map(|entry| {
                entry.attempt_count += 1;
                if correct {
                    entry.correct_count += 1;
                }
                Progress {
                    attempt_count: entry.attempt_count,
                    correct_count: entry.correct_count,
                }
            });
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::COMMON_WORDS;
    use std::sync::Arc;

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.seed_common_words(COMMON_WORDS).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_seed_runs_only_once() {
        let store = InMemoryStore::new();
        assert_eq!(store.seed_common_words(COMMON_WORDS).await.unwrap(), 10);
        assert_eq!(store.seed_common_words(COMMON_WORDS).await.unwrap(), 0);
        assert_eq!(store.words().await.len(), 10);
        assert!(store.words().await.iter().any(|w| w.target_term == "i"));
    }

    #[tokio::test]
    async fn test_ensure_user_enrolls_common_words_once() {
        let store = seeded().await;
        let first = store.ensure_user(100, "alice").await.unwrap();
        let second = store.ensure_user(100, "alice").await.unwrap();

        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(first.id, second.id);
        assert_eq!(store.list_words(first.id).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_lookup_user_never_creates() {
        let store = seeded().await;
        assert_eq!(store.lookup_user(5).await.unwrap(), None);
        let user = store.ensure_user(5, "bob").await.unwrap();
        assert_eq!(store.lookup_user(5).await.unwrap(), Some(user.id));
    }

    #[tokio::test]
    async fn test_add_word_twice_counts_once() {
        let store = seeded().await;
        let user = store.ensure_user(1, "alice").await.unwrap();

        let first = store.add_word(user.id, "Стол", " Table ").await.unwrap();
        let second = store.add_word(user.id, "стол", "table").await.unwrap();

        assert_eq!(first.total_words, 11);
        assert_eq!(second.total_words, 11);
        assert_eq!(first.word_id, second.word_id);
    }

    #[tokio::test]
    async fn test_add_word_reuses_shared_row_across_users() {
        let store = seeded().await;
        let alice = store.ensure_user(1, "alice").await.unwrap();
        let bob = store.ensure_user(2, "bob").await.unwrap();

        let a = store.add_word(alice.id, "кот", "cat").await.unwrap();
        let b = store.add_word(bob.id, "кот", "cat").await.unwrap();

        assert_eq!(a.word_id, b.word_id);
        assert_eq!(store.words().await.len(), 11);
    }

    #[tokio::test]
    async fn test_remove_word_keeps_shared_row() {
        let store = seeded().await;
        let alice = store.ensure_user(1, "alice").await.unwrap();
        let bob = store.ensure_user(2, "bob").await.unwrap();
        let added = store.add_word(alice.id, "кот", "cat").await.unwrap();
        store.add_word(bob.id, "кот", "cat").await.unwrap();

        assert!(store.remove_word(alice.id, added.word_id).await.unwrap());
        assert!(!store.remove_word(alice.id, added.word_id).await.unwrap());

        let alice_words = store.list_words(alice.id).await.unwrap();
        assert!(alice_words.iter().all(|w| w.word_id != added.word_id));
        let bob_words = store.list_words(bob.id).await.unwrap();
        assert!(bob_words.iter().any(|w| w.word_id == added.word_id));
        assert!(store.words().await.iter().any(|w| w.id == added.word_id));
    }

    #[tokio::test]
    async fn test_record_attempt_counts() {
        let store = seeded().await;
        let user = store.ensure_user(1, "alice").await.unwrap();
        let added = store.add_word(user.id, "кот", "cat").await.unwrap();

        let after_wrong = store
            .record_attempt(user.id, added.word_id, false)
            .await
            .unwrap()
            .unwrap();
        let after_right = store
            .record_attempt(user.id, added.word_id, true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after_wrong, Progress { attempt_count: 1, correct_count: 0 });
        assert_eq!(after_right, Progress { attempt_count: 2, correct_count: 1 });
        assert!(store.remove_word(user.id, added.word_id).await.unwrap());
        assert_eq!(
            store.record_attempt(user.id, added.word_id, true).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_sample_target_terms_respects_exclusions() {
        let store = seeded().await;
        let words = store.words().await;
        let red = words.iter().find(|w| w.target_term == "red").unwrap();
        let excluded = vec!["red".to_string(), "blue".to_string()];

        let sample = store
            .sample_target_terms(red.id, &excluded, 20)
            .await
            .unwrap();

        assert_eq!(sample.len(), 8);
        assert!(!sample.contains(&"red".to_string()));
        assert!(!sample.contains(&"blue".to_string()));
        let unique: BTreeSet<_> = sample.iter().collect();
        assert_eq!(unique.len(), sample.len());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_entries() {
        let store = seeded().await;
        let user = store.ensure_user(1, "alice").await.unwrap();
        assert!(store.delete_user(user.id).await);
        assert!(store.list_words(user.id).await.unwrap().is_empty());
        assert_eq!(store.lookup_user(1).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_word_creates_one_row() {
        let store = Arc::new(seeded().await);
        let user = store.ensure_user(9, "x").await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add_word(user.id, "кот", "cat").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cats: Vec<_> = store
            .words()
            .await
            .into_iter()
            .filter(|w| w.native_term == "кот" && w.target_term == "cat")
            .collect();
        assert_eq!(cats.len(), 1);
        let owned = store
            .list_words(user.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|w| w.word_id == cats[0].id)
            .count();
        assert_eq!(owned, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ensure_user_creates_one_user() {
        let store = Arc::new(seeded().await);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.ensure_user(77, "carol").await })
            })
            .collect();
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_new {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        let id = store.lookup_user(77).await.unwrap().unwrap();
        assert_eq!(store.list_words(id).await.unwrap().len(), 10);
    }
}
