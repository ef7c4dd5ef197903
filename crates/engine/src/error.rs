//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`MalformedRegistry`] thrown when the registry file cannot be read as a registry.
//! - [`UnknownParticipant`] thrown when a record references an undeclared boi.
//! - [`InvalidSplit`] thrown when an expense cannot be split.
//! - [`Ledger`] thrown when the generated ledger breaks one of its own invariants.
//!
//!  [`MalformedRegistry`]: EngineError::MalformedRegistry
//!  [`UnknownParticipant`]: EngineError::UnknownParticipant
//!  [`InvalidSplit`]: EngineError::InvalidSplit
//!  [`Ledger`]: EngineError::Ledger
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed registry: {0}")]
    MalformedRegistry(String),
    #[error("\"{0}\" is not a declared boi!")]
    UnknownParticipant(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Ledger invariant violated: {0}")]
    Ledger(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MalformedRegistry(a), Self::MalformedRegistry(b)) => a == b,
            (Self::UnknownParticipant(a), Self::UnknownParticipant(b)) => a == b,
            (Self::InvalidSplit(a), Self::InvalidSplit(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Ledger(a), Self::Ledger(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
