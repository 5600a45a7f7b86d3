//! Bracket matching
//!
//! [`JumpMap::build`] scans the program once, left to right, pushing the index
//! of every `[` onto a stack and popping it at the matching `]`. Both
//! directions are recorded so the interpreters can jump with a single lookup.

use super::Program;
use crate::interpreter::errors::RuntimeError;
use rustc_hash::FxHashMap;

/// Bidirectional map between matching loop brackets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpMap {
    targets: FxHashMap<usize, usize>,
}

impl JumpMap {
    /// Build the jump map for `program`
    ///
    /// Fails with [`RuntimeError::UnmatchedBracket`] on a `]` with no pending
    /// `[`, or on a `[` still open at the end of the program.
    pub fn build(program: &Program) -> Result<Self, RuntimeError> {
        let mut targets = FxHashMap::default();
        let mut open: Vec<usize> = Vec::new();

        for (index, &c) in program.chars().iter().enumerate() {
            match c {
                '[' => open.push(index),
                ']' => {
                    let start = open
                        .pop()
                        .ok_or(RuntimeError::UnmatchedBracket { index })?;
                    targets.insert(start, index);
                    targets.insert(index, start);
                }
                _ => {}
            }
        }

        // Report the innermost unclosed bracket
        if let Some(&index) = open.last() {
            return Err(RuntimeError::UnmatchedBracket { index });
        }

        Ok(JumpMap { targets })
    }

    /// Matching partner of the bracket at `index`
    pub fn target(&self, index: usize) -> Option<usize> {
        self.targets.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.targets.iter().map(|(&from, &to)| (from, to))
    }
}
