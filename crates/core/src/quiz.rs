//! Quiz Engine
//!
//! Picks a word from a user's vocabulary, builds a multiple-choice option set
//! around its target term, and scores the answer. The only state kept here is
//! the active question per user; everything else lives in the store.
//!
//! Option sets are built in three steps:
//! 1. up to `n - 1` distractors are drawn from the user's other words,
//! 2. missing distractors are topped up from the global word pool, excluding
//!    the tested word and every term already chosen,
//! 3. the correct term and the distractors are shuffled together.
//!
//! When neither source has enough distinct terms the question simply carries
//! fewer options, down to the correct term alone.

use crate::error::{Error, Result};
use crate::model::{Progress, UserId, VocabularyItem, WordId, normalize_term};
use crate::store::VocabularyStore;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A question presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub word_id: WordId,
    /// The native term the user must translate.
    pub prompt: String,
    /// Shuffled target terms; exactly one of them is correct.
    pub options: Vec<String>,
}

/// Result of scoring an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub is_correct: bool,
    /// The canonical answer, shown whether or not the user got it right.
    pub correct_term: String,
    /// Updated counters; `None` if the word left the user's list meanwhile.
    pub progress: Option<Progress>,
}

#[derive(Debug, Clone)]
struct ActiveQuestion {
    word_id: WordId,
    correct_term: String,
}

pub struct QuizEngine {
    store: Arc<dyn VocabularyStore>,
    option_count: usize,
    active: Mutex<HashMap<UserId, ActiveQuestion>>,
}

impl QuizEngine {
    /// Creates an engine producing up to `option_count` options per question.
    pub fn new(store: Arc<dyn VocabularyStore>, option_count: usize) -> Self {
        Self {
            store,
            option_count: option_count.max(1),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Selects a word uniformly at random and makes it the active question.
    ///
    /// Any unanswered question of the user is abandoned. Returns `None` when
    /// the user's vocabulary is empty; no question is active afterwards.
    pub async fn start_quiz(&self, user_id: UserId) -> Result<Option<QuizQuestion>> {
        let words = self.store.list_words(user_id).await?;
        let picked = pick_word(&words, &mut rand::rng()).cloned();
        let Some(word) = picked else {
            self.active.lock().await.remove(&user_id);
            debug!(%user_id, "quiz requested with empty vocabulary");
            return Ok(None);
        };

        let wanted = self.option_count - 1;
        let mut distractors = own_distractors(&words, &word, wanted, &mut rand::rng());
        if distractors.len() < wanted {
            let mut exclude = distractors.clone();
            exclude.push(word.target_term.clone());
            let top_up = self
                .store
                .sample_target_terms(word.word_id, &exclude, wanted - distractors.len())
                .await?;
            distractors.extend(top_up);
        }
        let options = assemble_options(&word.target_term, distractors, wanted, &mut rand::rng());

        self.active.lock().await.insert(
            user_id,
            ActiveQuestion {
                word_id: word.word_id,
                correct_term: word.target_term.clone(),
            },
        );
        debug!(%user_id, word_id = %word.word_id, options = options.len(), "quiz question issued");

        Ok(Some(QuizQuestion {
            word_id: word.word_id,
            prompt: word.native_term,
            options,
        }))
    }

    /// Scores an answer against the active question and records the attempt.
    ///
    /// The comparison ignores case and surrounding whitespace. The active
    /// question is cleared as soon as the answer is taken.
    pub async fn submit_answer(&self, user_id: UserId, answer: &str) -> Result<Outcome> {
        let question = self
            .active
            .lock()
            .await
            .remove(&user_id)
            .ok_or(Error::NoActiveQuestion)?;

        let is_correct = normalize_term(answer) == normalize_term(&question.correct_term);
        let progress = self
            .store
            .record_attempt(user_id, question.word_id, is_correct)
            .await?;
        info!(%user_id, word_id = %question.word_id, is_correct, "quiz answer scored");

        Ok(Outcome {
            is_correct,
            correct_term: question.correct_term,
            progress,
        })
    }

    /// Drops the user's active question. Returns whether one was pending.
    pub async fn abandon(&self, user_id: UserId) -> bool {
        self.active.lock().await.remove(&user_id).is_some()
    }

    pub async fn has_active_question(&self, user_id: UserId) -> bool {
        self.active.lock().await.contains_key(&user_id)
    }
}

/// Uniform choice of the word to test.
pub(crate) fn pick_word<'a, R: Rng + ?Sized>(
    words: &'a [VocabularyItem],
    rng: &mut R,
) -> Option<&'a VocabularyItem> {
    words.choose(rng)
}

/// Up to `limit` distinct target terms from the user's other words.
///
/// Terms equal to the correct answer are skipped, so two native words sharing
/// a translation never produce a duplicate option.
pub(crate) fn own_distractors<R: Rng + ?Sized>(
    words: &[VocabularyItem],
    tested: &VocabularyItem,
    limit: usize,
    rng: &mut R,
) -> Vec<String> {
    let pool: Vec<&str> = words
        .iter()
        .filter(|w| w.word_id != tested.word_id && w.target_term != tested.target_term)
        .map(|w| w.target_term.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    pool.choose_multiple(rng, limit)
        .map(|t| (*t).to_string())
        .collect()
}

/// Combines the correct term with at most `limit` distractors and shuffles.
///
/// Duplicates are dropped, so the result never repeats an option text.
pub(crate) fn assemble_options<R: Rng + ?Sized>(
    correct: &str,
    distractors: Vec<String>,
    limit: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut options = vec![correct.to_string()];
    for term in distractors {
        if options.len() > limit {
            break;
        }
        if !options.contains(&term) {
            options.push(term);
        }
    }
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::seed::COMMON_WORDS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn item(id: i64, native: &str, target: &str) -> VocabularyItem {
        VocabularyItem {
            word_id: WordId(id),
            native_term: native.to_string(),
            target_term: target.to_string(),
            attempt_count: 0,
            correct_count: 0,
        }
    }

    async fn engine_with_user(seed: bool) -> (Arc<InMemoryStore>, QuizEngine, UserId) {
        let store = Arc::new(InMemoryStore::new());
        if seed {
            store.seed_common_words(COMMON_WORDS).await.unwrap();
        }
        let user = store.ensure_user(1, "alice").await.unwrap();
        let engine = QuizEngine::new(store.clone(), 4);
        (store, engine, user.id)
    }

    #[test]
    fn test_own_distractors_skip_tested_word_and_its_term() {
        let words = vec![
            item(1, "кот", "cat"),
            item(2, "кошка", "cat"),
            item(3, "пес", "dog"),
            item(4, "собака", "dog"),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let picked = own_distractors(&words, &words[0], 3, &mut rng);
        assert_eq!(picked, vec!["dog".to_string()]);
    }

    #[test]
    fn test_assemble_options_contains_correct_once() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let options = assemble_options(
                "cat",
                vec!["dog".into(), "cat".into(), "dog".into(), "cow".into(), "owl".into()],
                3,
                &mut rng,
            );
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|o| *o == "cat").count(), 1);
            let unique: BTreeSet<_> = options.iter().collect();
            assert_eq!(unique.len(), options.len());
        }
    }

    #[test]
    fn test_assemble_options_shuffles_position() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut first_positions = BTreeSet::new();
        for _ in 0..100 {
            let options = assemble_options(
                "cat",
                vec!["dog".into(), "cow".into(), "owl".into()],
                3,
                &mut rng,
            );
            first_positions.insert(options.iter().position(|o| o == "cat").unwrap());
        }
        assert_eq!(first_positions.len(), 4);
    }

    #[test]
    fn test_pick_word_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(pick_word(&[], &mut rng).is_none());
    }

    #[tokio::test]
    async fn test_start_quiz_empty_vocabulary() {
        let (_store, engine, user) = engine_with_user(false).await;
        assert_eq!(engine.start_quiz(user).await.unwrap(), None);
        assert!(!engine.has_active_question(user).await);
    }

    #[tokio::test]
    async fn test_question_has_four_unique_options_with_answer() {
        let (store, engine, user) = engine_with_user(true).await;
        let words = store.list_words(user).await.unwrap();

        for _ in 0..30 {
            let question = engine.start_quiz(user).await.unwrap().unwrap();
            let word = words.iter().find(|w| w.word_id == question.word_id).unwrap();
            assert_eq!(question.prompt, word.native_term);
            assert_eq!(question.options.len(), 4);
            let hits = question
                .options
                .iter()
                .filter(|o| **o == word.target_term)
                .count();
            assert_eq!(hits, 1);
            let unique: BTreeSet<_> = question.options.iter().collect();
            assert_eq!(unique.len(), 4);
        }
    }

    #[tokio::test]
    async fn test_single_word_tops_up_from_global_pool() {
        let (store, engine, _) = engine_with_user(true).await;
        let loner = store.ensure_user(2, "bob").await.unwrap().id;
        let words = store.list_words(loner).await.unwrap();
        for word in words {
            store.remove_word(loner, word.word_id).await.unwrap();
        }
        store.add_word(loner, "стол", "table").await.unwrap();

        let question = engine.start_quiz(loner).await.unwrap().unwrap();
        assert_eq!(question.prompt, "стол");
        assert_eq!(question.options.len(), 4);
        assert!(question.options.contains(&"table".to_string()));
    }

    #[tokio::test]
    async fn test_lonely_word_degenerates_to_single_option() {
        let (store, engine, user) = engine_with_user(false).await;
        store.add_word(user, "стол", "table").await.unwrap();

        let question = engine.start_quiz(user).await.unwrap().unwrap();
        assert_eq!(question.options, vec!["table".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_answer_scores_and_counts() {
        let (store, engine, user) = engine_with_user(false).await;
        let added = store.add_word(user, "стол", "table").await.unwrap();

        engine.start_quiz(user).await.unwrap().unwrap();
        let outcome = engine.submit_answer(user, "  TABLE ").await.unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.correct_term, "table");
        assert_eq!(
            outcome.progress,
            Some(Progress { attempt_count: 1, correct_count: 1 })
        );

        engine.start_quiz(user).await.unwrap().unwrap();
        let outcome = engine.submit_answer(user, "chair").await.unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_term, "table");

        let entry = store.entry(user, added.word_id).await.unwrap();
        assert_eq!(entry.attempt_count, 2);
        assert_eq!(entry.correct_count, 1);
        assert!(entry.correct_count <= entry.attempt_count);
    }

    #[tokio::test]
    async fn test_submit_without_question_fails() {
        let (store, engine, user) = engine_with_user(false).await;
        store.add_word(user, "стол", "table").await.unwrap();

        let err = engine.submit_answer(user, "table").await.unwrap_err();
        assert!(matches!(err, Error::NoActiveQuestion));

        engine.start_quiz(user).await.unwrap();
        engine.submit_answer(user, "table").await.unwrap();
        let err = engine.submit_answer(user, "table").await.unwrap_err();
        assert!(matches!(err, Error::NoActiveQuestion));
    }

    #[tokio::test]
    async fn test_abandon_clears_question() {
        let (store, engine, user) = engine_with_user(false).await;
        store.add_word(user, "стол", "table").await.unwrap();
        engine.start_quiz(user).await.unwrap();

        assert!(engine.abandon(user).await);
        assert!(!engine.abandon(user).await);
        assert!(matches!(
            engine.submit_answer(user, "table").await,
            Err(Error::NoActiveQuestion)
        ));
    }

    #[tokio::test]
    async fn test_answer_after_word_removed_still_scored() {
        let (store, engine, user) = engine_with_user(false).await;
        let added = store.add_word(user, "стол", "table").await.unwrap();
        engine.start_quiz(user).await.unwrap();
        store.remove_word(user, added.word_id).await.unwrap();

        let outcome = engine.submit_answer(user, "table").await.unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.progress, None);
    }
}
