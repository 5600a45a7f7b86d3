//! Debugger view state
//!
//! Output, breaks and the end of the run come from protocol events. A `step`
//! event shows the state before its instruction, so after each step the host
//! also calls [`DebugView::sync`] to show the state the instruction left.

use crate::interpreter::Machine;
use crate::protocol::{Event, EventSink};

/// What the panes display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugView {
    pub prog_ptr: usize,
    pub data_ptr: usize,
    pub cycle_count: u64,
    pub tape: Vec<u8>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub breaks: usize,
    pub finished: bool,
    pub error: Option<String>,
}

impl DebugView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take pointers, cycle count and tape from `machine`
    pub fn sync(&mut self, machine: &Machine) {
        self.prog_ptr = machine.prog_ptr();
        self.data_ptr = machine.data_ptr();
        self.cycle_count = machine.cycle_count();
        self.tape.clear();
        self.tape.extend_from_slice(machine.tape().as_slice());
    }

    /// Whether the run is over, successfully or not
    pub fn is_done(&self) -> bool {
        self.finished || self.error.is_some()
    }
}

impl EventSink for DebugView {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Step {
                prog_ptr,
                data_ptr,
                cycle_count,
                tape_snapshot,
            } => {
                self.prog_ptr = prog_ptr;
                self.data_ptr = data_ptr;
                self.cycle_count = cycle_count;
                self.tape = tape_snapshot;
            }
            Event::Stdout { byte } => self.stdout.push(byte),
            Event::Stderr { byte } => self.stderr.push(byte),
            Event::Break => self.breaks += 1,
            Event::Finished {
                cycle_count,
                stdout_bytes,
                stderr_bytes,
            } => {
                self.cycle_count = cycle_count;
                self.stdout = stdout_bytes;
                self.stderr = stderr_bytes;
                self.finished = true;
            }
            Event::Error { message } => self.error = Some(message),
        }
    }
}
