//! Steppable engine
//!
//! [`SteppableEngine::step`] executes exactly one instruction and reports what
//! happened through an [`EventSink`]. The engine never schedules itself: the
//! host decides when to call `step` (see [`crate::protocol::session`]).
//!
//! # Events per step
//!
//! ```text
//! step { prog_ptr, data_ptr, cycle_count, tape_snapshot }   before executing
//! stdout { byte } | stderr { byte } | break                 after, if produced
//! finished { cycle_count, stdout_bytes, stderr_bytes }       once, at the end
//! ```

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::machine::{Effect, Machine};
use crate::memory::TapeConfig;
use crate::program::{Dialect, JumpMap, Program};
use crate::protocol::{Event, EventSink};

/// What a single call to [`SteppableEngine::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction executed; more remain
    Executed,
    /// A `@` executed; the host should stop pacing
    Break,
    /// The program counter reached the end and `finished` was emitted
    Finished,
}

/// Executes one instruction per call using the extended instruction set
#[derive(Debug, Clone)]
pub struct SteppableEngine {
    program: Program,
    jumps: JumpMap,
    machine: Machine,
    finished: bool,
}

impl SteppableEngine {
    /// Load `source`, building its jump map
    pub fn new(
        source: &str,
        tape: TapeConfig,
        eof: u8,
        input: Vec<u8>,
    ) -> Result<Self, RuntimeError> {
        let program = Program::new(source);
        let jumps = JumpMap::build(&program)?;
        Ok(SteppableEngine {
            program,
            jumps,
            machine: Machine::new(tape, eof, input),
            finished: false,
        })
    }

    /// Execute one instruction, or finish if the program has run off its end
    ///
    /// Once finished, further calls return [`StepOutcome::Finished`] without
    /// emitting anything.
    pub fn step<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<StepOutcome, RuntimeError> {
        if self.finished {
            return Ok(StepOutcome::Finished);
        }

        if self.machine.is_halted(&self.program) {
            self.finished = true;
            sink.emit(Event::Finished {
                cycle_count: self.machine.cycle_count(),
                stdout_bytes: self.machine.stdout().to_vec(),
                stderr_bytes: self.machine.stderr().to_vec(),
            });
            return Ok(StepOutcome::Finished);
        }

        sink.emit(Event::Step {
            prog_ptr: self.machine.prog_ptr(),
            data_ptr: self.machine.data_ptr(),
            cycle_count: self.machine.cycle_count(),
            tape_snapshot: self.machine.tape().as_slice().to_vec(),
        });

        let effect = self
            .machine
            .execute_next(&self.program, &self.jumps, Dialect::Extended)?;

        match effect {
            Effect::None => Ok(StepOutcome::Executed),
            Effect::Stdout(byte) => {
                sink.emit(Event::Stdout { byte });
                Ok(StepOutcome::Executed)
            }
            Effect::Stderr(byte) => {
                sink.emit(Event::Stderr { byte });
                Ok(StepOutcome::Executed)
            }
            Effect::Break => {
                sink.emit(Event::Break);
                Ok(StepOutcome::Break)
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }
}
