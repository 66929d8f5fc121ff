//! Error types for roster validation and lifecycle misuse.
//!
//! Everything that can go wrong inside a tick is absorbed there; only input
//! validation and out-of-order lifecycle commands surface as errors.

use thiserror::Error;
use crate::game_server::simulation::GameState;

/// Rejected roster input. The caller should re-prompt for names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("a race needs at least {min} entries, got {found}")]
    TooFewEntries { min: usize, found: usize },
    #[error("a race allows at most {max} entries, got {found}")]
    TooManyEntries { max: usize, found: usize },
    #[error("at least {min} names must be non-empty, got {found}")]
    TooFewNames { min: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaceError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("cannot submit a roster while the server is {0:?}; reset first")]
    NotAwaitingRoster(GameState),
}
