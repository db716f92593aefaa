//! Shared Application State

use crate::config::Config;
use std::sync::Arc;
use vocabot_core::{ConversationService, VocabularyStore};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConversationService>,
    pub store: Arc<dyn VocabularyStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn VocabularyStore>, config: Config) -> Self {
        Self {
            conversations: Arc::new(ConversationService::new(
                store.clone(),
                config.settings.clone(),
            )),
            store,
            config: Arc::new(config),
        }
    }
}
