use crate::lexer::Token;
use crate::validate::ValidationIssue;
use thiserror::Error;

/// A problem found while parsing schema source, anchored to the offending
/// token.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message} at {}:{}", .token.line, .token.column)]
pub struct ParseIssue {
    pub token: Token,
    pub message: String,
}

impl ParseIssue {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        Self {
            token: token.clone(),
            message: message.into(),
        }
    }
}

/// Schema source that could not be parsed. Never empty.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid schema: {}", join(.0))]
pub struct ParseError(pub Vec<ParseIssue>);

/// A value rejected by a schema, for callers that prefer `?` over inspecting
/// the issue list. Never empty.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid value: {}", join(.0))]
pub struct ValidationError(pub Vec<ValidationIssue>);

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unsupported regex flag '{0}'")]
    UnknownFlag(char),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum SerdeConvertError {
    #[error("unknown schema kind '{0}'")]
    UnknownKind(String),

    /// The member is absent, or holds the wrong shape (e.g. a format name
    /// where a schema is needed).
    #[error("schema of kind '{kind}' is missing '{member}'")]
    Missing {
        kind: &'static str,
        member: &'static str,
    },

    #[error("unknown string format '{0}'")]
    UnknownFormat(String),

    #[error("literal value must be a boolean, number or string")]
    InvalidLiteral,

    #[error("record key must be a string schema")]
    KeyNotString,

    #[error("rest must be an array schema")]
    RestNotArray,

    #[error("selected member '{0}' is not defined in the group")]
    UnknownSelected(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
