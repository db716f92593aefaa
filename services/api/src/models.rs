//! API Models
//!
//! Wire representations of inbound messages, replies and vocabulary items,
//! documented through `utoipa` for the OpenAPI description.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vocabot_core::model::{VocabularyItem, WordId};
use vocabot_core::{Command, Inbound, Input, Reply, ReplyOption};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandName {
    Start,
    Help,
    Quiz,
    AddWord,
    DeleteWord,
    ListWords,
    ShowPage,
    Cancel,
}

/// What the user sent: free text, a menu command, or a picked word.
///
/// Free text that equals a command token (`/start`) or a menu label
/// (`Quiz 🎮`) is treated as that command.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPayload {
    Text {
        #[schema(example = "стол")]
        text: String,
    },
    Command {
        name: CommandName,
        /// Zero-based page, only read for `show_page`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<usize>,
    },
    SelectWord {
        word_id: i64,
    },
}

impl From<InputPayload> for Input {
    fn from(payload: InputPayload) -> Self {
        match payload {
            InputPayload::Text { text } => Input::parse(&text),
            InputPayload::Command { name, page } => Input::Command(match name {
                CommandName::Start => Command::Start,
                CommandName::Help => Command::Help,
                CommandName::Quiz => Command::Quiz,
                CommandName::AddWord => Command::AddWord,
                CommandName::DeleteWord => Command::DeleteWord,
                CommandName::ListWords => Command::ListWords,
                CommandName::ShowPage => Command::ShowPage(page.unwrap_or(0)),
                CommandName::Cancel => Command::Cancel,
            }),
            InputPayload::SelectWord { word_id } => Input::SelectWord(WordId(word_id)),
        }
    }
}

impl From<Input> for InputPayload {
    fn from(input: Input) -> Self {
        match input {
            Input::Text(text) => InputPayload::Text { text },
            Input::SelectWord(word_id) => InputPayload::SelectWord { word_id: word_id.0 },
            Input::Command(command) => {
                let (name, page) = match command {
                    Command::Start => (CommandName::Start, None),
                    Command::Help => (CommandName::Help, None),
                    Command::Quiz => (CommandName::Quiz, None),
                    Command::AddWord => (CommandName::AddWord, None),
                    Command::DeleteWord => (CommandName::DeleteWord, None),
                    Command::ListWords => (CommandName::ListWords, None),
                    Command::ShowPage(page) => (CommandName::ShowPage, Some(page)),
                    Command::Cancel => (CommandName::Cancel, None),
                };
                InputPayload::Command { name, page }
            }
        }
    }
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct InboundMessagePayload {
    /// Stable identity assigned by the chat transport.
    #[schema(example = 123456789)]
    pub external_id: i64,
    #[serde(default)]
    #[schema(example = "alice")]
    pub display_name: String,
    pub input: InputPayload,
}

impl From<InboundMessagePayload> for Inbound {
    fn from(payload: InboundMessagePayload) -> Self {
        Inbound::new(payload.external_id, payload.display_name, payload.input.into())
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct OptionPayload {
    pub label: String,
    /// Send this back as `input` to choose the option.
    pub input: InputPayload,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub text: String,
    pub options: Vec<OptionPayload>,
}

impl From<Reply> for ReplyPayload {
    fn from(reply: Reply) -> Self {
        Self {
            text: reply.text,
            options: reply
                .options
                .into_iter()
                .map(|ReplyOption { label, input }| OptionPayload {
                    label,
                    input: input.into(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct WordView {
    pub word_id: i64,
    #[schema(example = "стол")]
    pub native_term: String,
    #[schema(example = "table")]
    pub target_term: String,
    pub attempt_count: i32,
    pub correct_count: i32,
}

impl From<VocabularyItem> for WordView {
    fn from(item: VocabularyItem) -> Self {
        Self {
            word_id: item.word_id.0,
            native_term: item.native_term,
            target_term: item.target_term,
            attempt_count: item.attempt_count,
            correct_count: item.correct_count,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
