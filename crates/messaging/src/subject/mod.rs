mod error;

pub use error::Error;

/// Matches exactly one token.
pub const WILDCARD_ANY: &str = "*";

/// Matches one or more trailing tokens.
pub const WILDCARD_ALL: &str = ">";

/// Checks that `subject` is usable for subscribing.
///
/// # Errors
///
/// Returns an error if the subject is empty, has empty tokens, contains
/// whitespace, or uses `>` anywhere but the last token.
pub fn validate_subject(subject: &str) -> Result<(), Error> {
    if subject.is_empty() {
        return Err(Error::Empty);
    }

    if subject.chars().any(char::is_whitespace) {
        return Err(Error::Whitespace(subject.to_string()));
    }

    let tokens: Vec<&str> = subject.split('.').collect();
    let last = tokens.len() - 1;

    for (index, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            return Err(Error::EmptyToken(subject.to_string()));
        }
        if *token == WILDCARD_ALL && index != last {
            return Err(Error::MisplacedTail(subject.to_string()));
        }
    }

    Ok(())
}

/// Checks that `subject` is usable for publishing: valid and wildcard free.
///
/// # Errors
///
/// Returns an error if [`validate_subject`] fails or a wildcard token is present.
pub fn validate_publish_subject(subject: &str) -> Result<(), Error> {
    validate_subject(subject)?;

    if subject
        .split('.')
        .any(|token| token == WILDCARD_ANY || token == WILDCARD_ALL)
    {
        return Err(Error::Wildcard(subject.to_string()));
    }

    Ok(())
}

/// Returns true if the concrete `subject` is matched by `pattern`.
#[must_use]
pub fn matches(pattern: &str, subject: &str) -> bool {
    let mut pattern_tokens = pattern.split('.');
    let mut subject_tokens = subject.split('.');

    loop {
        match (pattern_tokens.next(), subject_tokens.next()) {
            (Some(WILDCARD_ALL), Some(_)) => return true,
            (Some(WILDCARD_ANY), Some(_)) => {}
            (Some(p), Some(s)) if p == s => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        assert!(matches("demo.requests", "demo.requests"));
        assert!(!matches("demo.requests", "demo.replies"));
        assert!(!matches("demo", "demo.requests"));
        assert!(!matches("demo.requests", "demo"));
    }

    #[test]
    fn test_single_token_wildcard() {
        assert!(matches("demo.*", "demo.requests"));
        assert!(matches("*.requests", "demo.requests"));
        assert!(!matches("demo.*", "demo"));
        assert!(!matches("demo.*", "demo.requests.extra"));
    }

    #[test]
    fn test_tail_wildcard() {
        assert!(matches("demo.>", "demo.requests"));
        assert!(matches("demo.>", "demo.requests.extra"));
        assert!(!matches("demo.>", "demo"));
        assert!(matches(">", "anything.at.all"));
    }

    #[test]
    fn test_validate_subject() {
        assert_eq!(validate_subject(""), Err(Error::Empty));
        assert!(matches!(validate_subject("a..b"), Err(Error::EmptyToken(_))));
        assert!(matches!(validate_subject(".a"), Err(Error::EmptyToken(_))));
        assert!(matches!(validate_subject("a b"), Err(Error::Whitespace(_))));
        assert!(matches!(
            validate_subject("a.>.b"),
            Err(Error::MisplacedTail(_))
        ));
        assert!(validate_subject("demo.*.>").is_ok());
        assert!(validate_subject("_INBOX.abc123").is_ok());
    }

    #[test]
    fn test_validate_publish_subject() {
        assert!(validate_publish_subject("demo.requests").is_ok());
        assert!(matches!(
            validate_publish_subject("demo.*"),
            Err(Error::Wildcard(_))
        ));
        assert!(matches!(
            validate_publish_subject("demo.>"),
            Err(Error::Wildcard(_))
        ));
    }
}
