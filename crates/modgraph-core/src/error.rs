//! Error types for the parse/update boundary

use crate::model::ModuleId;
use thiserror::Error;

/// Failure reported by an [`ImportParser`](crate::importees::ImportParser).
///
/// Kept distinct from "no imports" so callers can hold on to the previous edge
/// set instead of pruning it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error in {id} at line {line}")]
    Syntax { id: ModuleId, line: u32 },

    #[error("no parser for {0}")]
    UnsupportedSource(ModuleId),

    #[error("parser backend failed for {id}: {message}")]
    Backend { id: ModuleId, message: String },
}

impl ParseError {
    /// The module whose source failed to parse.
    pub fn module(&self) -> &ModuleId {
        match self {
            ParseError::Syntax { id, .. } | ParseError::Backend { id, .. } => id,
            ParseError::UnsupportedSource(id) => id,
        }
    }
}
