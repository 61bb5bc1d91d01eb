// Error module - grammatical rejections, fatal engine errors and configuration errors

use crate::grammars::{Lookahead, Terminal};
use serde::Serialize;
use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why an input was rejected by the grammar.
///
/// Positions are indices into the tokenized lookahead sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// The terminal on top of the stack does not equal the current lookahead
    #[error("terminal mismatch at position {position}: expected '{expected}', found {found}")]
    TerminalMismatch {
        expected: Terminal,
        found: Lookahead,
        position: usize,
    },

    /// The stack emptied before the input was fully consumed
    #[error("trailing input at position {position}: {remaining} symbol(s) left unconsumed")]
    TrailingInput { position: usize, remaining: usize },
}

/// Result of one parse invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum ParseOutcome {
    Accepted,
    Rejected(Rejection),
}

impl ParseOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ParseOutcome::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ParseOutcome::Accepted => None,
            ParseOutcome::Rejected(reason) => Some(reason),
        }
    }
}

/// Fatal failures of the engine itself. These are never a property of the
/// input's grammaticality.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("symbol stack could not grow: {0}")]
    ResourceExhaustion(#[from] TryReserveError),

    /// The defensive step limit was hit. Points at a grammar table bug
    #[error("parse exceeded the iteration cap of {limit} steps")]
    IterationCapExceeded { limit: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid parser config: {0}")]
    Json(#[from] serde_json::Error),
}
