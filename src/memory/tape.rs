//! Growable byte tape
//!
//! The tape keeps a backing store whose size is always a power of two and a
//! logical length that only grows, one cell at a time, at the high end. When
//! the logical length reaches the capacity the backing store doubles, so a
//! run of `n` pushes costs O(n) in total.

use crate::interpreter::errors::RuntimeError;

/// What happens when the cell pointer moves past the last cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapePolicy {
    /// Append a zero cell and keep going
    #[default]
    Growable,
    /// Fail with [`RuntimeError::OutOfRange`]
    Fixed,
}

/// Tape shape chosen once per run and shared by both interpreters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeConfig {
    pub initial_len: usize,
    pub policy: TapePolicy,
}

impl TapeConfig {
    pub fn growable(initial_len: usize) -> Self {
        TapeConfig {
            initial_len,
            policy: TapePolicy::Growable,
        }
    }

    pub fn fixed(len: usize) -> Self {
        TapeConfig {
            initial_len: len,
            policy: TapePolicy::Fixed,
        }
    }
}

/// Addressable, dynamically growing sequence of byte cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowableTape {
    cells: Box<[u8]>,
    len: usize,
}

/// Smallest power of two `>= n`, never less than 1
fn round_up_to_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

impl GrowableTape {
    /// Create a zeroed tape of logical length `initial_len`
    pub fn new(initial_len: usize) -> Self {
        let capacity = round_up_to_power_of_two(initial_len);
        GrowableTape {
            cells: vec![0; capacity].into_boxed_slice(),
            len: initial_len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Read the cell at `index`
    pub fn at(&self, index: usize) -> Result<u8, RuntimeError> {
        if index >= self.len {
            return Err(RuntimeError::past_end(index, self.len));
        }
        Ok(self.cells[index])
    }

    /// Write the cell at `index`
    pub fn set(&mut self, index: usize, value: u8) -> Result<(), RuntimeError> {
        if index >= self.len {
            return Err(RuntimeError::past_end(index, self.len));
        }
        self.cells[index] = value;
        Ok(())
    }

    /// Append one cell, doubling the backing store when full
    pub fn push(&mut self, value: u8) {
        if self.len == self.cells.len() {
            let mut grown = vec![0; self.cells.len() * 2].into_boxed_slice();
            grown[..self.len].copy_from_slice(&self.cells[..self.len]);
            self.cells = grown;
        }
        self.cells[self.len] = value;
        self.len += 1;
    }

    /// The logical cells, `0..len`
    pub fn as_slice(&self) -> &[u8] {
        &self.cells[..self.len]
    }
}

impl Default for GrowableTape {
    fn default() -> Self {
        GrowableTape::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rounds_capacity() {
        assert_eq!(GrowableTape::new(4).capacity(), 4);
        assert_eq!(GrowableTape::new(5).capacity(), 8);
        assert_eq!(GrowableTape::new(1024).capacity(), 1024);

        let empty = GrowableTape::new(0);
        assert_eq!(empty.capacity(), 1);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_push_doubles_and_preserves() {
        let mut tape = GrowableTape::new(4);
        for i in 0..4 {
            tape.set(i, i as u8 + 10).unwrap();
        }
        for i in 0..5 {
            tape.push(100 + i);
        }
        assert_eq!(tape.len(), 9);
        assert_eq!(tape.capacity(), 16);
        assert_eq!(tape.as_slice(), &[10, 11, 12, 13, 100, 101, 102, 103, 104]);
    }

    #[test]
    fn test_single_growth_step() {
        let mut tape = GrowableTape::new(4);
        tape.push(7);
        assert_eq!(tape.capacity(), 8);
        assert_eq!(tape.at(4), Ok(7));
    }

    #[test]
    fn test_bounds_checked() {
        let mut tape = GrowableTape::new(2);
        assert_eq!(tape.at(1), Ok(0));
        assert_eq!(
            tape.at(2),
            Err(RuntimeError::OutOfRange {
                index: 2,
                length: 2
            })
        );
        assert!(tape.set(2, 1).is_err());
        // Capacity beyond the logical length is not addressable
        let tape = GrowableTape::new(3);
        assert!(tape.at(3).is_err());
    }
}
