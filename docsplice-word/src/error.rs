use docsplice::{
    compiler::{
        ParseError,
        PositionedError,
    },
    SequenceError,
};
use thiserror::Error;

use crate::SourceError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] PositionedError<ParseError>),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid substitution table line {line}: {reason}")]
    Substitution { line: usize, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
