use thiserror::Error;

/// An error that can occur when validating subjects.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The subject has no tokens.
    #[error("subject must not be empty")]
    Empty,

    /// Two dots with nothing between them, or a leading/trailing dot.
    #[error("subject '{0}' contains an empty token")]
    EmptyToken(String),

    /// The subject contains whitespace.
    #[error("subject '{0}' must not contain whitespace")]
    Whitespace(String),

    /// A `>` wildcard appears somewhere other than the final token.
    #[error("subject '{0}' may only use '>' as its final token")]
    MisplacedTail(String),

    /// Wildcards cannot be published to.
    #[error("cannot publish to wildcard subject '{0}'")]
    Wildcard(String),
}
