//! Command/event protocol between a host and the engine
//!
//! Hosts send [`Command`]s and receive [`Event`]s. On the wire both are JSON
//! objects, one per line: commands are tagged by `"command"`, events by
//! `"type"`.
//!
//! ```text
//! {"command":"start","mode":"simple","source":",[.,]","eof":0,"input":[104,105],"interval":50}
//! {"type":"step","prog_ptr":0,"data_ptr":0,"cycle_count":0,"tape_snapshot":[0,...]}
//! {"type":"stdout","byte":104}
//! {"type":"finished","cycle_count":9,"stdout_bytes":[104,105],"stderr_bytes":[]}
//! ```
//!
//! - [`session`]: session state machine and the [`SessionHost`] dispatcher
//! - [`cadence`]: host-owned pacing of stepped sessions
//! - [`errors`]: protocol error types

pub mod cadence;
pub mod errors;
pub mod session;

pub use cadence::Cadence;
pub use errors::ProtocolError;
pub use session::{Session, SessionHost, SessionId, SessionStatus};

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::mpsc;
use tracing::error;

/// Execution mode requested by `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Batch run, single `finished` event
    #[serde(alias = "disable")]
    Disabled,
    /// Stepped session paced by the host
    Simple,
}

impl Mode {
    const NAMES: [&'static str; 3] = ["disabled", "disable", "simple"];
}

fn default_interval() -> u64 {
    crate::config::DEFAULT_INTERVAL_MS
}

/// Parameters of a `start` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub mode: Mode,
    pub source: String,
    #[serde(default)]
    pub eof: u8,
    #[serde(default)]
    pub input: Vec<u8>,
    /// Tick interval in milliseconds
    #[serde(default = "default_interval")]
    pub interval: u64,
}

/// Host → engine messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Start(StartRequest),
    Stop,
    Restart {
        #[serde(default = "default_interval")]
        interval: u64,
    },
    Step,
}

impl Command {
    const NAMES: [&'static str; 4] = ["start", "stop", "restart", "step"];

    /// Decode one JSON message
    ///
    /// Unknown `command` or `mode` values are reported by name; anything else
    /// that does not fit the schema is [`ProtocolError::Malformed`].
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        let name = value
            .get("command")
            .and_then(|c| c.as_str())
            .ok_or_else(|| ProtocolError::Malformed("missing \"command\" field".to_string()))?;
        if !Self::NAMES.contains(&name) {
            return Err(ProtocolError::UnknownCommand(name.to_string()));
        }

        if name == "start" {
            if let Some(mode) = value.get("mode").and_then(|m| m.as_str()) {
                if !Mode::NAMES.contains(&mode) {
                    return Err(ProtocolError::UnknownMode(mode.to_string()));
                }
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Engine → host messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Emitted before each instruction in stepped mode
    Step {
        prog_ptr: usize,
        data_ptr: usize,
        cycle_count: u64,
        tape_snapshot: Vec<u8>,
    },
    Stdout {
        byte: u8,
    },
    Stderr {
        byte: u8,
    },
    /// A `@` halted pacing
    Break,
    /// Terminal, for both modes
    Finished {
        cycle_count: u64,
        stdout_bytes: Vec<u8>,
        stderr_bytes: Vec<u8>,
    },
    /// Fatal failure; the session is over and no `finished` follows
    Error {
        message: String,
    },
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Finished { .. } | Event::Error { .. })
    }
}

/// Where the engine sends its events
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl EventSink for mpsc::Sender<Event> {
    fn emit(&mut self, event: Event) {
        // A dropped receiver means the host is gone; nothing left to tell
        let _ = self.send(event);
    }
}

/// Writes each event as one line of JSON
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: Event) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to encode event");
                return;
            }
        };
        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            error!(error = %e, "Failed to write event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_start_with_defaults() {
        let command =
            Command::from_json(r#"{"command":"start","mode":"simple","source":"+."}"#).unwrap();
        assert_eq!(
            command,
            Command::Start(StartRequest {
                mode: Mode::Simple,
                source: "+.".to_string(),
                eof: 0,
                input: vec![],
                interval: 100,
            })
        );
    }

    #[test]
    fn test_decode_legacy_mode_name() {
        let command = Command::from_json(
            r#"{"command":"start","mode":"disable","source":"","eof":7,"input":[1,2]}"#,
        )
        .unwrap();
        match command {
            Command::Start(req) => {
                assert_eq!(req.mode, Mode::Disabled);
                assert_eq!(req.eof, 7);
                assert_eq!(req.input, vec![1, 2]);
            }
            other => panic!("Expected start, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_simple_commands() {
        assert_eq!(Command::from_json(r#"{"command":"stop"}"#).unwrap(), Command::Stop);
        assert_eq!(Command::from_json(r#"{"command":"step"}"#).unwrap(), Command::Step);
        assert_eq!(
            Command::from_json(r#"{"command":"restart","interval":20}"#).unwrap(),
            Command::Restart { interval: 20 }
        );
    }

    #[test]
    fn test_unknown_command_and_mode() {
        assert_eq!(
            Command::from_json(r#"{"command":"stepout"}"#),
            Err(ProtocolError::UnknownCommand("stepout".to_string()))
        );
        assert_eq!(
            Command::from_json(r#"{"command":"start","mode":"logging","source":""}"#),
            Err(ProtocolError::UnknownMode("logging".to_string()))
        );
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            Command::from_json("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Command::from_json(r#"{"mode":"simple"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Command::from_json(r#"{"command":"start","mode":"simple","eof":300,"source":""}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(Event::Stdout { byte: 65 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "stdout", "byte": 65}));

        let json = serde_json::to_value(Event::Break).unwrap();
        assert_eq!(json, serde_json::json!({"type": "break"}));

        let json = serde_json::to_value(Event::Finished {
            cycle_count: 3,
            stdout_bytes: vec![1],
            stderr_bytes: vec![],
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "finished",
                "cycle_count": 3,
                "stdout_bytes": [1],
                "stderr_bytes": []
            })
        );
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(Event::Stderr { byte: 1 });
        sink.emit(Event::Break);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "{\"type\":\"stderr\",\"byte\":1}\n{\"type\":\"break\"}\n"
        );
    }
}
