//! Interpreter execution engines
//!
//! This module provides the two ways of running a program:
//! - [`batch`]: runs to completion and returns all output at once
//! - [`stepper`]: executes one instruction per call and emits events
//! - [`machine`]: the single-instruction core both of them drive
//! - [`errors`]: runtime error types
//!
//! # Execution Model
//!
//! The program counter walks the program one character at a time. After each
//! instruction the counter advances by one and the cycle count goes up by one;
//! a taken jump first moves the counter onto the matching bracket.

pub mod batch;
pub mod errors;
pub mod machine;
pub mod stepper;

pub use batch::{BatchInterpreter, BatchOutcome};
pub use errors::RuntimeError;
pub use machine::{Effect, Machine};
pub use stepper::{StepOutcome, SteppableEngine};
