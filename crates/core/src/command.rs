//! Inbound Message Vocabulary
//!
//! Transports deliver either distinguished command tokens (`/start`), menu
//! button labels, structured callback selections, or free text. This module
//! turns all of them into an [`Input`], so the state machine dispatches on
//! closed enums instead of comparing display strings.

use crate::model::WordId;

/// Structured actions a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Register (or greet again) and show the main menu.
    Start,
    /// Show usage help.
    Help,
    /// Ask a quiz question.
    Quiz,
    /// Begin the two-step add-word dialog.
    AddWord,
    /// List the user's words as deletion choices.
    DeleteWord,
    /// Show the first page of the user's words.
    ListWords,
    /// Show a specific (zero-based) page of the user's words.
    ShowPage(usize),
    /// Abandon whatever dialog is in progress.
    Cancel,
}

const QUIZ_LABEL: &str = "Quiz 🎮";
const ADD_WORD_LABEL: &str = "Add word ➕";
const DELETE_WORD_LABEL: &str = "Delete word ➖";
const LIST_WORDS_LABEL: &str = "My words 📋";
const CANCEL_LABEL: &str = "Cancel ❌";

impl Command {
    /// The button label of a menu command, if it has one.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Command::Quiz => Some(QUIZ_LABEL),
            Command::AddWord => Some(ADD_WORD_LABEL),
            Command::DeleteWord => Some(DELETE_WORD_LABEL),
            Command::ListWords => Some(LIST_WORDS_LABEL),
            Command::Cancel => Some(CANCEL_LABEL),
            Command::Start | Command::Help | Command::ShowPage(_) => None,
        }
    }

    /// Maps a button label back to its command.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            QUIZ_LABEL => Some(Command::Quiz),
            ADD_WORD_LABEL => Some(Command::AddWord),
            DELETE_WORD_LABEL => Some(Command::DeleteWord),
            LIST_WORDS_LABEL => Some(Command::ListWords),
            CANCEL_LABEL => Some(Command::Cancel),
            _ => None,
        }
    }

    /// Parses a `/command` token, ignoring a trailing `@botname` suffix.
    pub fn from_token(text: &str) -> Option<Self> {
        let token = text.strip_prefix('/')?;
        let name = token.split('@').next().unwrap_or_default();
        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    /// The main menu offered whenever a dialog returns to idle.
    pub fn main_menu() -> [Command; 4] {
        [
            Command::Quiz,
            Command::AddWord,
            Command::DeleteWord,
            Command::ListWords,
        ]
    }
}

/// One inbound interaction, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// A structured choice of a specific word (callback data).
    SelectWord(WordId),
    /// Anything else; interpreted according to the dialog state.
    Text(String),
}

impl Input {
    /// Classifies raw message text.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(command) = Command::from_token(trimmed).or_else(|| Command::from_label(trimmed))
        {
            return Input::Command(command);
        }
        Input::Text(text.to_string())
    }
}

/// A message event as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub external_id: i64,
    pub display_name: String,
    pub input: Input,
}

impl Inbound {
    pub fn new(external_id: i64, display_name: impl Into<String>, input: Input) -> Self {
        Self {
            external_id,
            display_name: display_name.into(),
            input,
        }
    }

    /// Shorthand for a plain text message.
    pub fn text(external_id: i64, display_name: impl Into<String>, text: &str) -> Self {
        Self::new(external_id, display_name, Input::parse(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_tokens() {
        assert_eq!(Input::parse("/start"), Input::Command(Command::Start));
        assert_eq!(Input::parse("/help@vocabot"), Input::Command(Command::Help));
        assert_eq!(Input::parse("/unknown"), Input::Text("/unknown".into()));
    }

    #[test]
    fn test_parse_menu_labels() {
        for command in Command::main_menu() {
            let label = command.label().unwrap();
            assert_eq!(Input::parse(label), Input::Command(command));
        }
        assert_eq!(Input::parse(" Cancel ❌ "), Input::Command(Command::Cancel));
    }

    #[test]
    fn test_parse_free_text_is_kept_verbatim() {
        assert_eq!(Input::parse(" Стол "), Input::Text(" Стол ".into()));
        assert_eq!(Input::parse("quiz"), Input::Text("quiz".into()));
    }

    #[test]
    fn test_show_page_has_no_label() {
        assert_eq!(Command::ShowPage(2).label(), None);
        assert_eq!(Command::Start.label(), None);
    }
}
