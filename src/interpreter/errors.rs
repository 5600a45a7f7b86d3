//! Runtime error types for the interpreters
//!
//! This module defines [`RuntimeError`], the errors that can occur while
//! loading or executing a program (as opposed to protocol errors, see
//! [`crate::protocol::ProtocolError`]).
//!
//! All runtime errors are fatal - they abort the run and are never retried.

use thiserror::Error;

/// Runtime errors that can occur during load or execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A `]` with no pending `[`, or a `[` left open at end of program
    #[error("Unmatched bracket at index {index}")]
    UnmatchedBracket { index: usize },

    /// Cell pointer moved below zero, or a cell index past the tape's length
    #[error("{}", describe_out_of_range(.index, .length))]
    OutOfRange { index: isize, length: usize },
}

fn describe_out_of_range(index: &isize, length: &usize) -> String {
    if *index < 0 {
        "Out of range: cell pointer moved below 0".to_string()
    } else {
        format!(
            "Out of range: cell {} is past the end of a tape of length {}",
            index, length
        )
    }
}

impl RuntimeError {
    /// Out of range error for a pointer that would move below zero
    pub(crate) fn underflow(length: usize) -> Self {
        RuntimeError::OutOfRange { index: -1, length }
    }

    pub(crate) fn past_end(index: usize, length: usize) -> Self {
        RuntimeError::OutOfRange {
            index: index as isize,
            length,
        }
    }
}
