use crate::command::{Command, Input};

/// A suggested quick reply: what to display, and what to send back when chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOption {
    pub label: String,
    pub input: Input,
}

/// The bot's answer to one inbound message.
///
/// Rendering (keyboards, inline buttons, markup) is left to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub options: Vec<ReplyOption>,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, label: impl Into<String>, input: Input) -> Self {
        self.options.push(ReplyOption {
            label: label.into(),
            input,
        });
        self
    }

    /// Appends a labelled menu command.
    pub fn with_command(self, command: Command) -> Self {
        match command.label() {
            Some(label) => self.with_option(label, Input::Command(command)),
            None => self,
        }
    }

    pub fn with_main_menu(self) -> Self {
        Command::main_menu()
            .into_iter()
            .fold(self, |reply, command| reply.with_command(command))
    }

    pub fn with_cancel(self) -> Self {
        self.with_command(Command::Cancel)
    }

    /// Labels of all options, in display order.
    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_has_four_actions() {
        let reply = Reply::new("hi").with_main_menu();
        assert_eq!(
            reply.labels(),
            vec!["Quiz 🎮", "Add word ➕", "Delete word ➖", "My words 📋"]
        );
        assert_eq!(reply.options[0].input, Input::Command(Command::Quiz));
    }

    #[test]
    fn test_unlabelled_command_is_skipped() {
        let reply = Reply::new("hi").with_command(Command::Start);
        assert!(reply.options.is_empty());
    }
}
