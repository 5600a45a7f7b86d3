//! # Introduction
//!
//! bfstep runs Brainfuck programs two ways: a batch interpreter that runs to
//! completion, and a steppable engine that executes one instruction at a time
//! and reports every step as an event. Stepped runs are paced by a host-owned
//! cadence and can be stopped, resumed and stepped by hand.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Program → JumpMap → Machine ─┬─► BatchInterpreter → stdout
//!                                       └─► SteppableEngine → Events → Session
//! ```
//!
//! 1. [`program`]: decodes source characters and pairs the brackets.
//! 2. [`memory`]: the byte tape and its growth policy.
//! 3. [`interpreter`]: the single-instruction [`interpreter::Machine`] and
//!    the two front ends built on it.
//! 4. [`protocol`]: commands, events, sessions and their cadence.
//! 5. [`worker`]: JSON-lines host over any reader and writer.
//! 6. [`ui`]: ratatui-based debugger; not part of the stable library API.
//!
//! ## Instruction set
//!
//! `+ - > < [ ] , .` everywhere; the stepped engine also knows `:` (write to
//! stderr) and `@` (breakpoint). Every other character is a comment.

pub mod config;
pub mod interpreter;
pub mod logging;
pub mod memory;
pub mod program;
pub mod protocol;
pub mod ui;
pub mod worker;
