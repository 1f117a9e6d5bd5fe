//! Error type shared by every engine module.

use thiserror::Error;

use crate::reading_engine::models::SessionState;

pub type ReadingResult<T> = Result<T, ReadingError>;

/// Failures surfaced by the reading engine.
///
/// Configuration and invariant errors are returned to the caller as-is and are
/// never retried. Out-of-order reveals are not errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    #[error("Unknown spread type: '{0}'")]
    UnknownSpreadType(String),

    #[error("Spread '{spread}' has {labels} position labels but {cards} cards were drawn")]
    SpreadMismatch {
        spread: String,
        labels: usize,
        cards: usize,
    },

    #[error("Cannot draw {requested} cards from a deck of {available}")]
    InvalidSpreadSize { requested: usize, available: usize },

    #[error("Invalid spread definition '{spread}': {reason}")]
    InvalidSpreadDefinition { spread: String, reason: String },

    #[error("Duplicate card identifier in deck: '{0}'")]
    DuplicateCard(String),

    #[error("Card catalog is empty")]
    EmptyCatalog,

    #[error("Cannot {operation} while session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Card catalog error: {0}")]
    Catalog(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReadingError {
    pub fn invalid_spread(spread: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpreadDefinition { spread: spread.into(), reason: reason.into() }
    }

    /// True for errors caused by a misconfigured spread table or deck,
    /// which must be fixed rather than retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownSpreadType(_)
                | Self::SpreadMismatch { .. }
                | Self::InvalidSpreadDefinition { .. }
                | Self::DuplicateCard(_)
                | Self::Config(_)
        )
    }
}

impl From<serde_json::Error> for ReadingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Catalog(format!("JSON: {err}"))
    }
}

impl From<toml::de::Error> for ReadingError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML: {err}"))
    }
}
