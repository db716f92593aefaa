//! Conversation State Machine
//!
//! Routes every inbound message according to the sender's dialog state and
//! performs the transition. Each user owns one [`Session`] behind its own
//! async mutex: messages of one user are handled strictly one at a time and
//! in arrival order, while different users proceed concurrently.
//!
//! Sessions live for the lifetime of the process. A restart puts every user
//! back into [`DialogState::Idle`].
//!
//! Storage failures never escape [`ConversationService::handle`]; they are
//! logged and turned into an apology reply.

use crate::command::{Command, Inbound, Input};
use crate::error::{Error, Result};
use crate::model::{UserId, VocabularyItem, WordId, normalize_term};
use crate::quiz::QuizEngine;
use crate::reply::Reply;
use crate::settings::Settings;
use crate::store::VocabularyStore;
use crate::texts;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, instrument, warn};

/// A word offered in the deletion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionChoice {
    pub word_id: WordId,
    pub label: String,
}

/// What the bot expects from a user next. Scratch data travels with the state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Idle,
    AwaitingNativeTerm,
    AwaitingTargetTerm {
        native_term: String,
    },
    AwaitingDeletionChoice {
        choices: Vec<DeletionChoice>,
    },
    AwaitingQuizAnswer,
}

/// Per-user conversation data.
#[derive(Debug, Default)]
pub struct Session {
    pub state: DialogState,
    /// Set once the sender is known to the store.
    pub user_id: Option<UserId>,
}

/// Sessions keyed by external identity.
///
/// A session is created when a message arrives and kept only if its sender
/// turns out to be a registered user.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    /// Waits for exclusive access to the user's session.
    pub async fn acquire(&self, external_id: i64) -> OwnedMutexGuard<Session> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions.entry(external_id).or_default().clone()
        };
        session.lock_owned().await
    }

    /// Releases the session and forgets it unless another message is queued on it.
    pub async fn discard(&self, external_id: i64, session: OwnedMutexGuard<Session>) {
        let mut sessions = self.sessions.lock().await;
        // One reference in the map, one held by `session`; more means waiters.
        let unused = sessions
            .get(&external_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 2);
        if unused {
            sessions.remove(&external_id);
        }
        drop(session);
    }

    pub async fn get(&self, external_id: i64) -> Option<Arc<Mutex<Session>>> {
        self.sessions.lock().await.get(&external_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

pub struct ConversationService {
    store: Arc<dyn VocabularyStore>,
    quiz: QuizEngine,
    sessions: SessionRegistry,
    settings: Settings,
}

impl ConversationService {
    pub fn new(store: Arc<dyn VocabularyStore>, settings: Settings) -> Self {
        Self {
            quiz: QuizEngine::new(store.clone(), settings.quiz_options),
            store,
            sessions: SessionRegistry::default(),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn VocabularyStore> {
        &self.store
    }

    pub fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    /// The current dialog state of a user (waits for in-flight messages).
    pub async fn dialog_state(&self, external_id: i64) -> DialogState {
        match self.sessions.get(external_id).await {
            Some(session) => session.lock().await.state.clone(),
            None => DialogState::Idle,
        }
    }

    /// Number of users with a live session.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Handles one inbound message and produces the reply.
    #[instrument(skip(self, inbound), fields(external_id = inbound.external_id))]
    pub async fn handle(&self, inbound: Inbound) -> Reply {
        let mut session = self.sessions.acquire(inbound.external_id).await;
        let reply = match self.dispatch(&mut session, &inbound).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(error = %err, state = ?session.state, "failed to handle message");
                with_menu_for(Reply::new(texts::storage_failure()), &session.state)
            }
        };
        if session.user_id.is_none() {
            self.sessions.discard(inbound.external_id, session).await;
        }
        reply
    }

    async fn dispatch(&self, session: &mut Session, inbound: &Inbound) -> Result<Reply> {
        match &inbound.input {
            Input::Command(Command::Start) => {
                return self.start(session, inbound).await;
            }
            Input::Command(Command::Help) => {
                return Ok(with_menu_for(Reply::new(texts::help()), &session.state));
            }
            _ => {}
        }

        let Some(user_id) = self.store.lookup_user(inbound.external_id).await? else {
            warn!("message from unregistered user");
            return Ok(Reply::new(texts::not_registered()));
        };
        session.user_id = Some(user_id);

        match &inbound.input {
            Input::Command(command) => self.on_command(session, user_id, *command).await,
            Input::SelectWord(word_id) => self.on_selection(session, user_id, *word_id).await,
            Input::Text(text) => self.on_text(session, user_id, text).await,
        }
    }

    async fn start(&self, session: &mut Session, inbound: &Inbound) -> Result<Reply> {
        let user = self
            .store
            .ensure_user(inbound.external_id, &inbound.display_name)
            .await?;
        if user.is_new {
            info!(user_id = %user.id, name = %inbound.display_name, "new user enrolled");
        }
        session.user_id = Some(user.id);
        self.reset(session, user.id).await;
        Ok(Reply::new(texts::welcome(&inbound.display_name, user.is_new)).with_main_menu())
    }

    /// Discards in-flight scratch data and returns the session to idle.
    async fn reset(&self, session: &mut Session, user_id: UserId) {
        if self.quiz.abandon(user_id).await {
            info!(%user_id, "unanswered quiz question abandoned");
        }
        session.state = DialogState::Idle;
    }

    async fn on_command(
        &self,
        session: &mut Session,
        user_id: UserId,
        command: Command,
    ) -> Result<Reply> {
        match command {
            // Both are answered before the user is authorized.
            Command::Start | Command::Help => {
                Ok(with_menu_for(Reply::new(texts::help()), &session.state))
            }
            Command::Cancel => {
                self.reset(session, user_id).await;
                Ok(Reply::new(texts::cancelled()).with_main_menu())
            }
            Command::Quiz => {
                self.reset(session, user_id).await;
                self.ask_question(session, user_id).await
            }
            Command::AddWord => {
                self.reset(session, user_id).await;
                session.state = DialogState::AwaitingNativeTerm;
                Ok(Reply::new(texts::ask_native(&self.settings.languages)).with_cancel())
            }
            Command::DeleteWord => {
                self.reset(session, user_id).await;
                self.offer_deletion(session, user_id).await
            }
            Command::ListWords => {
                self.reset(session, user_id).await;
                self.show_page(user_id, 0).await
            }
            Command::ShowPage(page) => {
                self.reset(session, user_id).await;
                self.show_page(user_id, page).await
            }
        }
    }

    async fn on_selection(
        &self,
        session: &mut Session,
        user_id: UserId,
        word_id: WordId,
    ) -> Result<Reply> {
        if matches!(session.state, DialogState::AwaitingDeletionChoice { .. }) {
            return self.delete(session, user_id, word_id).await;
        }
        Ok(with_menu_for(Reply::new(texts::choose_action()), &session.state))
    }

    async fn on_text(&self, session: &mut Session, user_id: UserId, text: &str) -> Result<Reply> {
        match &session.state {
            DialogState::Idle => Ok(Reply::new(texts::choose_action()).with_main_menu()),
            DialogState::AwaitingNativeTerm => {
                let native_term = match self.validate_term(text) {
                    Ok(term) => term,
                    Err(_) => return Ok(self.invalid_term_reply()),
                };
                let reply = Reply::new(texts::ask_target(&native_term, &self.settings.languages))
                    .with_cancel();
                session.state = DialogState::AwaitingTargetTerm { native_term };
                Ok(reply)
            }
            DialogState::AwaitingTargetTerm { native_term } => {
                let target_term = match self.validate_term(text) {
                    Ok(term) => term,
                    Err(_) => return Ok(self.invalid_term_reply()),
                };
                let native_term = native_term.clone();
                session.state = DialogState::Idle;
                Ok(self.add_word(user_id, &native_term, &target_term).await)
            }
            DialogState::AwaitingDeletionChoice { choices } => {
                match match_choice(choices, text) {
                    Ok(word_id) => self.delete(session, user_id, word_id).await,
                    Err(_) => {
                        let reply = choices
                            .iter()
                            .fold(Reply::new(texts::pick_from_list()), |reply, choice| {
                                reply.with_option(&choice.label, Input::SelectWord(choice.word_id))
                            });
                        Ok(reply.with_cancel())
                    }
                }
            }
            DialogState::AwaitingQuizAnswer => {
                session.state = DialogState::Idle;
                match self.quiz.submit_answer(user_id, text).await {
                    Ok(outcome) => {
                        let text = if outcome.is_correct {
                            texts::answer_correct(&outcome.correct_term)
                        } else {
                            texts::answer_wrong(&outcome.correct_term)
                        };
                        Ok(Reply::new(text).with_main_menu())
                    }
                    Err(Error::NoActiveQuestion) => {
                        warn!(%user_id, "answer without an active question");
                        Ok(Reply::new(texts::restart_quiz()).with_main_menu())
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    async fn ask_question(&self, session: &mut Session, user_id: UserId) -> Result<Reply> {
        let Some(question) = self.quiz.start_quiz(user_id).await? else {
            return Ok(Reply::new(texts::no_words_for_quiz()).with_main_menu());
        };
        session.state = DialogState::AwaitingQuizAnswer;
        let reply = question
            .options
            .iter()
            .fold(Reply::new(texts::quiz_prompt(&question.prompt)), |reply, option| {
                reply.with_option(option, Input::Text(option.clone()))
            });
        Ok(reply)
    }

    async fn add_word(&self, user_id: UserId, native_term: &str, target_term: &str) -> Reply {
        match self.store.add_word(user_id, native_term, target_term).await {
            Ok(added) => {
                info!(%user_id, word_id = %added.word_id, total = added.total_words, "word added");
                Reply::new(texts::word_added(native_term, target_term, added.total_words))
                    .with_main_menu()
            }
            Err(err) => {
                error!(%user_id, error = %err, "failed to add word");
                Reply::new(texts::add_failed()).with_main_menu()
            }
        }
    }

    async fn offer_deletion(&self, session: &mut Session, user_id: UserId) -> Result<Reply> {
        let words = self.store.list_words(user_id).await?;
        if words.is_empty() {
            return Ok(Reply::new(texts::no_words_to_delete()).with_main_menu());
        }
        let choices: Vec<DeletionChoice> = words
            .iter()
            .map(|item| DeletionChoice {
                word_id: item.word_id,
                label: texts::pair_label(item),
            })
            .collect();
        let reply = choices
            .iter()
            .fold(Reply::new(texts::choose_word_to_delete()), |reply, choice| {
                reply.with_option(&choice.label, Input::SelectWord(choice.word_id))
            })
            .with_cancel();
        session.state = DialogState::AwaitingDeletionChoice { choices };
        Ok(reply)
    }

    async fn delete(&self, session: &mut Session, user_id: UserId, word_id: WordId) -> Result<Reply> {
        let removed = self.store.remove_word(user_id, word_id).await?;
        session.state = DialogState::Idle;
        if removed {
            info!(%user_id, %word_id, "word removed");
            Ok(Reply::new(texts::word_deleted()).with_main_menu())
        } else {
            Ok(Reply::new(texts::word_not_in_list()).with_main_menu())
        }
    }

    async fn show_page(&self, user_id: UserId, page: usize) -> Result<Reply> {
        let words = self.store.list_words(user_id).await?;
        if words.is_empty() {
            return Ok(Reply::new(texts::empty_list()).with_main_menu());
        }
        let per_page = self.settings.words_per_page.max(1);
        let (page, pages, items) = paginate(&words, page, per_page);
        let mut reply = Reply::new(texts::word_list_page(
            items,
            page * per_page + 1,
            page,
            pages,
        ));
        if page > 0 {
            reply = reply.with_option(
                texts::PREVIOUS_PAGE,
                Input::Command(Command::ShowPage(page - 1)),
            );
        }
        if page + 1 < pages {
            reply = reply.with_option(texts::NEXT_PAGE, Input::Command(Command::ShowPage(page + 1)));
        }
        Ok(reply.with_main_menu())
    }

    fn validate_term(&self, raw: &str) -> Result<String> {
        let term = normalize_term(raw);
        let max = self.settings.max_term_length;
        if term.is_empty() || term.chars().count() > max {
            return Err(Error::InvalidTerm { max });
        }
        Ok(term)
    }

    fn invalid_term_reply(&self) -> Reply {
        Reply::new(texts::invalid_term(self.settings.max_term_length)).with_cancel()
    }
}

/// Finds the word whose label equals the text exactly (after trimming).
///
/// Different pairs can render to the same label (`"a - b" / "c"` and
/// `"a" / "b - c"`); such a label selects nothing.
fn match_choice(choices: &[DeletionChoice], text: &str) -> Result<WordId> {
    let text = text.trim();
    let mut matches = choices.iter().filter(|choice| choice.label == text);
    match (matches.next(), matches.next()) {
        (Some(choice), None) => Ok(choice.word_id),
        _ => Err(Error::InvalidSelection),
    }
}

/// Clamps `page` to the last page and returns `(page, page_count, items)`.
fn paginate(words: &[VocabularyItem], page: usize, per_page: usize) -> (usize, usize, &[VocabularyItem]) {
    let pages = words.len().div_ceil(per_page);
    let page = page.min(pages.saturating_sub(1));
    let start = page * per_page;
    let end = (start + per_page).min(words.len());
    (page, pages, &words[start..end])
}

/// Idle replies offer the main menu; replies mid-dialog offer cancel.
fn with_menu_for(reply: Reply, state: &DialogState) -> Reply {
    match state {
        DialogState::Idle => reply.with_main_menu(),
        _ => reply.with_cancel(),
    }
}
