//! Core of the vocabulary drill bot.
//!
//! Transport-independent: an inbound message goes in through
//! [`ConversationService::handle`] and a [`Reply`] comes out. Persistence is
//! behind the [`VocabularyStore`] trait; [`InMemoryStore`] is a complete
//! implementation for tests and single-process deployments.

pub mod command;
pub mod conversation;
pub mod error;
pub mod memory;
pub mod model;
pub mod quiz;
pub mod reply;
pub mod seed;
pub mod settings;
pub mod store;
pub mod texts;

pub use command::{Command, Inbound, Input};
pub use conversation::{ConversationService, DialogState};
pub use error::{Error, Result};
pub use memory::InMemoryStore;
pub use reply::{Reply, ReplyOption};
pub use settings::{Languages, Settings};
pub use store::{SeedPair, VocabularyStore};
