//! Memory model for the interpreters
//!
//! - [`tape`]: the byte tape a program reads and writes through its cell
//!   pointer, with the [`TapePolicy`] deciding what happens past the last cell
//!
//! # Cell Arithmetic
//!
//! Cells are `u8` and wrap on overflow and underflow:
//! ```text
//! 255 + 1  →  0
//!   0 - 1  →  255
//! ```

pub mod tape;

pub use tape::{GrowableTape, TapeConfig, TapePolicy};
