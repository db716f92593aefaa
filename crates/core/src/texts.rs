//! User-facing reply texts.

use crate::model::VocabularyItem;
use crate::settings::Languages;

pub fn welcome(name: &str, is_new: bool) -> String {
    let opening = if is_new {
        format!("Hi, {name}! 👋")
    } else {
        format!("Welcome back, {name}! 👋")
    };
    format!(
        "{opening}\n\n\
         I help you learn new words. With me you can:\n\
         • test yourself in a quiz 🎮\n\
         • add new words to learn ➕\n\
         • delete words you already know ➖\n\
         • browse your word list 📋\n\n\
         Pick an action from the menu below 👇"
    )
}

pub fn help() -> String {
    "📚 How to use the bot\n\n\
     Commands:\n\
     /start - start working with the bot\n\
     /help - show this help\n\n\
     Actions:\n\
     • Quiz 🎮 - translate a word, pick from the options\n\
     • Add word ➕ - add a new pair to your list\n\
     • Delete word ➖ - remove a word from your list\n\
     • My words 📋 - show all your words\n\n\
     Press any button in the menu to begin 👇"
        .to_string()
}

pub fn not_registered() -> String {
    "Please send /start to begin.".to_string()
}

pub fn choose_action() -> String {
    "Please choose an action from the menu below 👇".to_string()
}

pub fn cancelled() -> String {
    "Action cancelled. Choose another action:".to_string()
}

pub fn storage_failure() -> String {
    "❌ Something went wrong on our side. Please try again in a moment.".to_string()
}

pub fn ask_native(languages: &Languages) -> String {
    format!("Enter the word in {}:", languages.native)
}

pub fn ask_target(native_term: &str, languages: &Languages) -> String {
    format!(
        "Now enter the {} translation of '{native_term}':",
        languages.target
    )
}

pub fn invalid_term(max: usize) -> String {
    format!("A word must be between 1 and {max} characters. Please try again:")
}

pub fn word_added(native_term: &str, target_term: &str, total: i64) -> String {
    format!(
        "✅ The word '{native_term} - {target_term}' was added!\n\
         You now have {total} words to learn."
    )
}

pub fn add_failed() -> String {
    "❌ Could not add the word. Please try again.".to_string()
}

pub fn no_words_for_quiz() -> String {
    "You have no words for a quiz yet. Add some with 'Add word ➕'.".to_string()
}

pub fn quiz_prompt(native_term: &str) -> String {
    format!("Translate the word: {native_term}")
}

pub fn answer_correct(term: &str) -> String {
    format!("✅ Correct! '{term}' is the right answer.\n\nPress 'Quiz 🎮' for the next question.")
}

pub fn answer_wrong(correct_term: &str) -> String {
    format!(
        "❌ Wrong. The correct answer is '{correct_term}'.\n\n\
         Press 'Quiz 🎮' for the next question."
    )
}

pub fn restart_quiz() -> String {
    "Something went wrong. Please start the quiz again.".to_string()
}

pub fn no_words_to_delete() -> String {
    "You have no words to delete yet.".to_string()
}

pub fn choose_word_to_delete() -> String {
    "Choose a word to delete:".to_string()
}

pub fn pick_from_list() -> String {
    "Please pick a word from the list, or cancel.".to_string()
}

pub fn word_deleted() -> String {
    "✅ The word was deleted!".to_string()
}

pub fn word_not_in_list() -> String {
    "That word is not in your list.".to_string()
}

pub fn empty_list() -> String {
    "You have no words yet. Add some with 'Add word ➕'.".to_string()
}

/// The button text of a word in the deletion list.
pub fn pair_label(item: &VocabularyItem) -> String {
    format!("{} - {}", item.native_term, item.target_term)
}

/// One page of the word list, numbered continuously from `first_number`.
pub fn word_list_page(
    items: &[VocabularyItem],
    first_number: usize,
    page: usize,
    pages: usize,
) -> String {
    let mut text = String::from("📋 Your words:\n\n");
    for (offset, item) in items.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", first_number + offset, pair_label(item)));
    }
    if pages > 1 {
        text.push_str(&format!("\nPage {} of {pages}", page + 1));
    }
    text
}

pub const PREVIOUS_PAGE: &str = "◀ Previous";
pub const NEXT_PAGE: &str = "Next ▶";
