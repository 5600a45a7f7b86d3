//! JSON-lines worker host
//!
//! Reads [`Command`]s one per line, dispatches them to a [`SessionHost`] and
//! writes [`Event`]s one per line. The worker remembers the handle of the
//! session it started last, since the wire commands do not carry one.
//!
//! The loop owns the cadence: it waits for the next command for at most the
//! time left until the next tick, then ticks.

use crate::config::EngineConfig;
use crate::protocol::{
    Command, Event, EventSink, JsonLinesSink, ProtocolError, SessionHost, SessionId,
};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Command dispatcher for one worker connection
#[derive(Debug)]
pub struct Worker {
    host: SessionHost,
    current: Option<SessionId>,
}

impl Worker {
    pub fn new(config: EngineConfig) -> Self {
        Worker {
            host: SessionHost::new(config),
            current: None,
        }
    }

    /// Decode and dispatch one line
    ///
    /// Errors are also reported to `sink` as an `error` event.
    pub fn handle_line<S: EventSink + ?Sized>(
        &mut self,
        line: &str,
        now: Instant,
        sink: &mut S,
    ) -> Result<(), ProtocolError> {
        let result = Command::from_json(line)
            .and_then(|command| self.dispatch(command, now, &mut *sink));
        if let Err(ref e) = result {
            // Runtime failures have already been reported by the session
            if !matches!(e, ProtocolError::Runtime(_)) {
                warn!(error = %e, "rejected command");
                sink.emit(Event::Error {
                    message: e.to_string(),
                });
            }
        }
        result
    }

    pub fn dispatch<S: EventSink + ?Sized>(
        &mut self,
        command: Command,
        now: Instant,
        sink: &mut S,
    ) -> Result<(), ProtocolError> {
        debug!(?command, "dispatch");
        match command {
            Command::Start(request) => {
                self.current = None;
                self.current = self.host.start(request, now, sink)?;
                Ok(())
            }
            Command::Stop => self.host.stop(self.current_id()?),
            Command::Restart { interval } => {
                self.host.restart(self.current_id()?, interval, now)
            }
            Command::Step => self.host.step(self.current_id()?, sink).map(|_| ()),
        }
    }

    pub fn tick<S: EventSink + ?Sized>(&mut self, now: Instant, sink: &mut S) {
        // Failures end the session and are already reported as events
        let _ = self.host.tick(now, sink);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.host.next_deadline()
    }

    pub fn host(&self) -> &SessionHost {
        &self.host
    }

    fn current_id(&self) -> Result<SessionId, ProtocolError> {
        self.current.ok_or(ProtocolError::NoSession)
    }
}

/// Serve commands from `reader` until it closes and no session is stepping
pub fn serve<R, W>(reader: R, writer: W, config: EngineConfig) -> io::Result<()>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel::<io::Result<String>>();
    thread::spawn(move || {
        for line in reader.lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut worker = Worker::new(config);
    let mut sink = JsonLinesSink::new(writer);
    let mut input_open = true;

    loop {
        let deadline = worker.next_deadline();

        if input_open {
            let received = match deadline {
                Some(at) => rx.recv_timeout(at.saturating_duration_since(Instant::now())),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        let _ = worker.handle_line(&line, Instant::now(), &mut sink);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("command stream closed");
                    input_open = false;
                }
            }
        } else {
            match deadline {
                Some(at) => thread::sleep(at.saturating_duration_since(Instant::now())),
                None => break,
            }
        }

        worker.tick(Instant::now(), &mut sink);
    }

    Ok(())
}
