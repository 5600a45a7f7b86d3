// Defaults for the engine and its hosts

use crate::memory::{TapeConfig, TapePolicy};
use std::time::Duration;

/// Initial tape length for batch runs
pub const BATCH_TAPE_LEN: usize = 65536;

/// Initial tape length for stepped sessions
/// Kept small because every step event carries a copy of the tape
pub const STEPPED_TAPE_LEN: usize = 1024;

/// Default tick interval for stepped sessions, in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 100;

/// Default EOF code
pub const DEFAULT_EOF: u8 = 0;

/// Engine-wide settings a host picks once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub batch_tape: TapeConfig,
    pub stepped_tape: TapeConfig,
}

impl EngineConfig {
    /// Use `policy` for both modes, keeping the default initial lengths
    pub fn with_policy(policy: TapePolicy) -> Self {
        EngineConfig {
            batch_tape: TapeConfig {
                initial_len: BATCH_TAPE_LEN,
                policy,
            },
            stepped_tape: TapeConfig {
                initial_len: STEPPED_TAPE_LEN,
                policy,
            },
        }
    }

    /// Use `initial_len` for both modes, at least one cell
    pub fn with_tape_len(mut self, initial_len: usize) -> Self {
        let initial_len = initial_len.max(1);
        self.batch_tape.initial_len = initial_len;
        self.stepped_tape.initial_len = initial_len;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::with_policy(TapePolicy::Growable)
    }
}

/// Convert a millisecond interval from the wire, never zero
pub fn interval_from_millis(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}
