//! Execution state shared by both interpreters
//!
//! [`Machine`] holds everything that changes while a program runs: program
//! counter, cell pointer, tape, input cursor, cycle count and the two output
//! accumulators. [`Machine::execute_next`] runs exactly one instruction, so the
//! batch loop and the stepped engine agree on every opcode.

use crate::interpreter::errors::RuntimeError;
use crate::memory::{GrowableTape, TapeConfig, TapePolicy};
use crate::program::{Dialect, Instruction, JumpMap, Program};

/// Observable side effect of one executed instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Stdout(u8),
    Stderr(u8),
    Break,
}

/// Program counter, tape, input cursor, cycle count and output accumulators
#[derive(Debug, Clone)]
pub struct Machine {
    prog_ptr: usize,
    data_ptr: usize,
    tape: GrowableTape,
    policy: TapePolicy,
    input: Vec<u8>,
    input_ptr: usize,
    eof: u8,
    cycle_count: u64,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Machine {
    /// Create a machine at pc 0 on a zeroed tape
    ///
    /// The cell pointer always starts on a cell, so a zero `initial_len` is
    /// treated as one.
    pub fn new(tape: TapeConfig, eof: u8, input: Vec<u8>) -> Self {
        Machine {
            prog_ptr: 0,
            data_ptr: 0,
            tape: GrowableTape::new(tape.initial_len.max(1)),
            policy: tape.policy,
            input,
            input_ptr: 0,
            eof,
            cycle_count: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    /// Whether the program counter has run off the end of `program`
    pub fn is_halted(&self, program: &Program) -> bool {
        self.prog_ptr >= program.len()
    }

    /// Execute the instruction under the program counter
    ///
    /// Jumps land on the matching bracket; the program counter then advances
    /// by one as for every other instruction, and the cycle count goes up by
    /// one. On error the state is left as it was before the instruction.
    pub fn execute_next(
        &mut self,
        program: &Program,
        jumps: &JumpMap,
        dialect: Dialect,
    ) -> Result<Effect, RuntimeError> {
        let instruction = program
            .instruction_at(self.prog_ptr, dialect)
            .unwrap_or(Instruction::Comment);

        let mut effect = Effect::None;
        match instruction {
            Instruction::Increment => {
                let cell = self.current_cell()?;
                self.tape.set(self.data_ptr, cell.wrapping_add(1))?;
            }
            Instruction::Decrement => {
                let cell = self.current_cell()?;
                self.tape.set(self.data_ptr, cell.wrapping_sub(1))?;
            }
            Instruction::MoveRight => {
                let next = self.data_ptr + 1;
                if next >= self.tape.len() {
                    match self.policy {
                        TapePolicy::Growable => self.tape.push(0),
                        TapePolicy::Fixed => {
                            return Err(RuntimeError::past_end(next, self.tape.len()))
                        }
                    }
                }
                self.data_ptr = next;
            }
            Instruction::MoveLeft => {
                self.data_ptr = self
                    .data_ptr
                    .checked_sub(1)
                    .ok_or_else(|| RuntimeError::underflow(self.tape.len()))?;
            }
            Instruction::LoopStart => {
                if self.current_cell()? == 0 {
                    self.prog_ptr = Self::jump_target(jumps, self.prog_ptr)?;
                }
            }
            Instruction::LoopEnd => {
                if self.current_cell()? != 0 {
                    self.prog_ptr = Self::jump_target(jumps, self.prog_ptr)?;
                }
            }
            Instruction::Read => {
                let value = match self.input.get(self.input_ptr) {
                    Some(&byte) => {
                        self.input_ptr += 1;
                        byte
                    }
                    None => self.eof,
                };
                self.tape.set(self.data_ptr, value)?;
            }
            Instruction::Write => {
                let cell = self.current_cell()?;
                self.stdout.push(cell);
                effect = Effect::Stdout(cell);
            }
            Instruction::WriteSecondary => {
                let cell = self.current_cell()?;
                self.stderr.push(cell);
                effect = Effect::Stderr(cell);
            }
            Instruction::Breakpoint => effect = Effect::Break,
            Instruction::Comment => {}
        }

        self.prog_ptr += 1;
        self.cycle_count += 1;
        Ok(effect)
    }

    fn jump_target(jumps: &JumpMap, index: usize) -> Result<usize, RuntimeError> {
        jumps
            .target(index)
            .ok_or(RuntimeError::UnmatchedBracket { index })
    }

    fn current_cell(&self) -> Result<u8, RuntimeError> {
        self.tape.at(self.data_ptr)
    }

    // ========== Getters ==========

    pub fn prog_ptr(&self) -> usize {
        self.prog_ptr
    }

    pub fn data_ptr(&self) -> usize {
        self.data_ptr
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn tape(&self) -> &GrowableTape {
        &self.tape
    }

    pub fn input_ptr(&self) -> usize {
        self.input_ptr
    }

    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Consume the machine, returning its tape and both output buffers
    pub fn into_parts(self) -> (GrowableTape, Vec<u8>, Vec<u8>) {
        (self.tape, self.stdout, self.stderr)
    }
}
