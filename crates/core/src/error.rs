/// Errors surfaced by the vocabulary core.
///
/// Absence (unknown user, word not in a list) is not an error: store
/// operations return `Option`/`bool` for it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The persistence layer could not be reached or a query failed.
    #[error(transparent)]
    StorageUnavailable(#[from] anyhow::Error),
    /// A quiz answer arrived while no question was pending for the user.
    #[error("no active quiz question")]
    NoActiveQuestion,
    /// A deletion choice did not match any of the listed words.
    #[error("selection does not match any listed word")]
    InvalidSelection,
    /// A term was empty or longer than the configured maximum.
    #[error("term must be between 1 and {max} characters")]
    InvalidTerm { max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NoActiveQuestion.to_string(), "no active quiz question");
        assert_eq!(
            Error::InvalidTerm { max: 255 }.to_string(),
            "term must be between 1 and 255 characters"
        );
        let storage = Error::from(anyhow::anyhow!("connection refused"));
        assert_eq!(storage.to_string(), "connection refused");
    }
}
