use std::time::Duration;
use thiserror::Error;

/// Failure to split a generation response into its five sections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed plan structure: {0}")]
    MalformedStructure(String),
}

/// Failure of any call that goes through the text-generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("text service failure: {0}")]
    ServiceFailure(String),
    #[error("the response did not follow the expected structure ({0}); please try generating again")]
    MalformedStructure(String),
    #[error("text service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    PreconditionViolation(String),
}

impl From<ParseError> for GenerationError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::MalformedStructure(detail) => GenerationError::MalformedStructure(detail),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("expense item must not be empty")]
    EmptyItem,
    #[error("expense amount must be greater than zero")]
    NonPositiveAmount,
}
