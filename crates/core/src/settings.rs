/// Display names of the two configured languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    pub native: String,
    pub target: String,
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            native: "Russian".to_string(),
            target: "English".to_string(),
        }
    }
}

/// Tunables of the quiz and the word-list presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Total options per quiz question, the correct one included.
    pub quiz_options: usize,
    pub words_per_page: usize,
    /// Longest accepted term, in characters.
    pub max_term_length: usize,
    pub languages: Languages,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quiz_options: 4,
            words_per_page: 10,
            max_term_length: 255,
            languages: Languages::default(),
        }
    }
}
