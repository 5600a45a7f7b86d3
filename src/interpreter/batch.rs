//! Batch interpreter
//!
//! Runs a program to completion in one synchronous loop and hands back all of
//! its output at once. There are no events and no suspension points; the
//! secondary channel and breakpoints do not exist in this mode.

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::machine::Machine;
use crate::memory::{GrowableTape, TapeConfig};
use crate::program::{Dialect, JumpMap, Program};
use tracing::debug;

/// Result of a completed batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Primary output, in order
    pub stdout: Vec<u8>,
    /// Total instructions executed
    pub cycle_count: u64,
    /// Tape as the program left it
    pub tape: GrowableTape,
    /// Cell pointer when the program ended
    pub data_ptr: usize,
}

/// Runs programs to completion with a fixed tape shape
#[derive(Debug, Clone, Copy)]
pub struct BatchInterpreter {
    tape: TapeConfig,
}

impl BatchInterpreter {
    pub fn new(tape: TapeConfig) -> Self {
        BatchInterpreter { tape }
    }

    /// Run `program` until the program counter reaches its end
    pub fn run(
        &self,
        program: &Program,
        jumps: &JumpMap,
        eof: u8,
        input: &[u8],
    ) -> Result<BatchOutcome, RuntimeError> {
        let mut machine = Machine::new(self.tape, eof, input.to_vec());

        while !machine.is_halted(program) {
            machine.execute_next(program, jumps, Dialect::Classic)?;
        }

        debug!(
            cycles = machine.cycle_count(),
            output_len = machine.stdout().len(),
            "batch run complete"
        );

        let cycle_count = machine.cycle_count();
        let data_ptr = machine.data_ptr();
        let (tape, stdout, _) = machine.into_parts();
        Ok(BatchOutcome {
            stdout,
            cycle_count,
            tape,
            data_ptr,
        })
    }

    /// Build the jump map for `source` and run it
    pub fn run_source(
        &self,
        source: &str,
        eof: u8,
        input: &[u8],
    ) -> Result<BatchOutcome, RuntimeError> {
        let program = Program::new(source);
        let jumps = JumpMap::build(&program)?;
        self.run(&program, &jumps, eof, input)
    }
}

impl Default for BatchInterpreter {
    fn default() -> Self {
        BatchInterpreter::new(TapeConfig::growable(crate::config::BATCH_TAPE_LEN))
    }
}
