use thiserror::Error;

/// Errors produced when a token stream or rule text is not a well-formed expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of expression at token {position}; expected {expected}")]
    UnexpectedEnd {
        position: usize,
        expected: &'static str,
    },

    #[error("unexpected '{found}' at token {position}; expected {expected}")]
    UnexpectedToken {
        position: usize,
        found: String,
        expected: &'static str,
    },

    #[error("'(' at token {position} is never closed")]
    UnclosedParen { position: usize },

    #[error("'(' at token {position} nests deeper than {limit} groups")]
    TooDeep { position: usize, limit: usize },

    #[error("trailing '{found}' at token {position}")]
    Trailing { position: usize, found: String },

    #[error("syntax error: {message}")]
    Syntax { message: String },
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        ParseError::Syntax {
            message: message.into(),
        }
    }
}
