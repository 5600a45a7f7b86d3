//! Stepped sessions and the host-side dispatcher
//!
//! A [`Session`] wraps a [`SteppableEngine`] with a [`SessionStatus`] and a
//! [`Cadence`]. [`SessionHost`] owns at most one session at a time and hands
//! out a [`SessionId`] from `start`; every later command must carry that id.
//!
//! # State Machine
//!
//! ```text
//!             start                 stop / @
//! Initialized ─────► Stepping ◄──────────────► Paused
//!                        │        restart         │
//!                        └──── end of program ────┴──► Finished
//!
//! any fatal runtime error ──► Aborted
//! ```

use super::cadence::Cadence;
use super::errors::ProtocolError;
use super::{Event, EventSink, Mode, StartRequest};
use crate::config::{interval_from_millis, EngineConfig};
use crate::interpreter::{BatchInterpreter, RuntimeError, StepOutcome, SteppableEngine};
use crate::memory::TapeConfig;
use crate::program::{JumpMap, Program};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Handle naming one session of a [`SessionHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Created, cadence not yet armed
    Initialized,
    /// Cadence armed, one step per tick
    Stepping,
    /// Cadence cancelled, state retained
    Paused,
    /// Program counter reached the end of the program
    Finished,
    /// A runtime error ended the session
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Finished | SessionStatus::Aborted)
    }
}

/// One stepped run: engine, status and pacing
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    engine: SteppableEngine,
    status: SessionStatus,
    cadence: Cadence,
}

impl Session {
    pub fn new(
        id: SessionId,
        source: &str,
        tape: TapeConfig,
        eof: u8,
        input: Vec<u8>,
        interval: Duration,
    ) -> Result<Self, RuntimeError> {
        Ok(Session {
            id,
            engine: SteppableEngine::new(source, tape, eof, input)?,
            status: SessionStatus::Initialized,
            cadence: Cadence::new(interval),
        })
    }

    /// Arm the cadence and enter `Stepping`
    pub fn begin(&mut self, now: Instant) -> Result<(), ProtocolError> {
        self.ensure_live()?;
        self.cadence.arm(now);
        self.status = SessionStatus::Stepping;
        debug!(session = %self.id, "stepping");
        Ok(())
    }

    /// Cancel the cadence; the execution state is kept as is
    pub fn stop(&mut self) -> Result<(), ProtocolError> {
        self.ensure_live()?;
        if self.status != SessionStatus::Stepping {
            return Err(ProtocolError::InactiveSession(self.id));
        }
        self.cadence.cancel();
        self.status = SessionStatus::Paused;
        debug!(session = %self.id, cycles = self.cycle_count(), "paused");
        Ok(())
    }

    /// Resume pacing with a possibly new interval
    pub fn restart(&mut self, interval: Duration, now: Instant) -> Result<(), ProtocolError> {
        self.ensure_live()?;
        if self.status == SessionStatus::Stepping {
            self.cadence.set_interval(interval, now);
            return Ok(());
        }
        self.cadence = Cadence::new(interval);
        self.begin(now)
    }

    /// Execute exactly one instruction, independent of the cadence
    pub fn step<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<StepOutcome, ProtocolError> {
        self.ensure_live()?;
        match self.engine.step(sink) {
            Ok(StepOutcome::Executed) => Ok(StepOutcome::Executed),
            Ok(StepOutcome::Break) => {
                self.cadence.cancel();
                self.status = SessionStatus::Paused;
                debug!(session = %self.id, prog_ptr = self.engine.machine().prog_ptr(), "breakpoint");
                Ok(StepOutcome::Break)
            }
            Ok(StepOutcome::Finished) => {
                self.cadence.cancel();
                self.status = SessionStatus::Finished;
                info!(session = %self.id, cycles = self.cycle_count(), "session finished");
                Ok(StepOutcome::Finished)
            }
            Err(e) => {
                self.cadence.cancel();
                self.status = SessionStatus::Aborted;
                error!(session = %self.id, error = %e, "session aborted");
                sink.emit(Event::Error {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Step once if the cadence is due at `now`
    pub fn tick<S: EventSink + ?Sized>(
        &mut self,
        now: Instant,
        sink: &mut S,
    ) -> Result<Option<StepOutcome>, ProtocolError> {
        if self.status != SessionStatus::Stepping || !self.cadence.fire(now) {
            return Ok(None);
        }
        self.step(sink).map(Some)
    }

    fn ensure_live(&self) -> Result<(), ProtocolError> {
        if self.status.is_terminal() {
            return Err(ProtocolError::SessionFinished(self.id));
        }
        Ok(())
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub fn engine(&self) -> &SteppableEngine {
        &self.engine
    }

    pub fn cycle_count(&self) -> u64 {
        self.engine.machine().cycle_count()
    }
}

/// Owns the current session and routes commands to it by handle
#[derive(Debug)]
pub struct SessionHost {
    config: EngineConfig,
    session: Option<Session>,
    next_id: u64,
}

impl SessionHost {
    pub fn new(config: EngineConfig) -> Self {
        SessionHost {
            config,
            session: None,
            next_id: 1,
        }
    }

    /// Handle a `start` command
    ///
    /// Any previous session is discarded. `Disabled` runs the batch
    /// interpreter and emits a single `finished`; it returns no handle.
    /// `Simple` creates a session, arms its cadence and returns its handle.
    pub fn start<S: EventSink + ?Sized>(
        &mut self,
        request: StartRequest,
        now: Instant,
        sink: &mut S,
    ) -> Result<Option<SessionId>, ProtocolError> {
        if let Some(previous) = self.session.take() {
            debug!(session = %previous.id(), "discarding previous session");
        }

        match request.mode {
            Mode::Disabled => {
                self.run_batch(&request, sink)?;
                Ok(None)
            }
            Mode::Simple => {
                let id = SessionId(self.next_id);
                self.next_id += 1;

                let mut session = Session::new(
                    id,
                    &request.source,
                    self.config.stepped_tape,
                    request.eof,
                    request.input,
                    interval_from_millis(request.interval),
                )
                .map_err(|e| Self::report(&mut *sink, e))?;
                session.begin(now)?;
                self.session = Some(session);
                Ok(Some(id))
            }
        }
    }

    fn run_batch<S: EventSink + ?Sized>(
        &self,
        request: &StartRequest,
        sink: &mut S,
    ) -> Result<(), ProtocolError> {
        let program = Program::new(&request.source);
        let outcome = JumpMap::build(&program)
            .and_then(|jumps| {
                BatchInterpreter::new(self.config.batch_tape).run(
                    &program,
                    &jumps,
                    request.eof,
                    &request.input,
                )
            })
            .map_err(|e| Self::report(&mut *sink, e))?;

        info!(cycles = outcome.cycle_count, "batch run finished");
        sink.emit(Event::Finished {
            cycle_count: outcome.cycle_count,
            stdout_bytes: outcome.stdout,
            stderr_bytes: Vec::new(),
        });
        Ok(())
    }

    /// Emit the fatal signal for a runtime error raised outside a session
    fn report<S: EventSink + ?Sized>(sink: &mut S, e: RuntimeError) -> ProtocolError {
        error!(error = %e, "run aborted");
        sink.emit(Event::Error {
            message: e.to_string(),
        });
        e.into()
    }

    pub fn stop(&mut self, id: SessionId) -> Result<(), ProtocolError> {
        self.session_mut(id)?.stop()
    }

    pub fn restart(
        &mut self,
        id: SessionId,
        interval_ms: u64,
        now: Instant,
    ) -> Result<(), ProtocolError> {
        self.session_mut(id)?
            .restart(interval_from_millis(interval_ms), now)
    }

    pub fn step<S: EventSink + ?Sized>(
        &mut self,
        id: SessionId,
        sink: &mut S,
    ) -> Result<StepOutcome, ProtocolError> {
        self.session_mut(id)?.step(sink)
    }

    /// Run one paced step of the current session if it is due
    pub fn tick<S: EventSink + ?Sized>(
        &mut self,
        now: Instant,
        sink: &mut S,
    ) -> Result<Option<StepOutcome>, ProtocolError> {
        match self.session.as_mut() {
            Some(session) => session.tick(now, sink),
            None => Ok(None),
        }
    }

    /// When the host should next call [`SessionHost::tick`]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.session
            .as_ref()
            .filter(|s| s.status() == SessionStatus::Stepping)
            .and_then(|s| s.cadence().next_tick())
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.session.as_ref().filter(|s| s.id() == id)
    }

    /// The current session, if any
    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, ProtocolError> {
        match self.session.as_mut() {
            Some(session) if session.id() == id => Ok(session),
            _ => Err(ProtocolError::UnknownSession(id)),
        }
    }
}

impl Default for SessionHost {
    fn default() -> Self {
        SessionHost::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn simple(source: &str) -> StartRequest {
        StartRequest {
            mode: Mode::Simple,
            source: source.to_string(),
            eof: 0,
            input: Vec::new(),
            interval: 10,
        }
    }

    fn host() -> SessionHost {
        SessionHost::new(EngineConfig::default().with_tape_len(4))
    }

    #[test]
    fn test_start_enters_stepping() {
        let mut host = host();
        let mut events = Vec::new();
        let now = Instant::now();
        let id = host.start(simple("+"), now, &mut events).unwrap().unwrap();

        let session = host.session(id).unwrap();
        assert_eq!(session.status(), SessionStatus::Stepping);
        assert_eq!(host.next_deadline(), Some(now + 10 * MS));
        assert!(events.is_empty());
    }

    #[test]
    fn test_ticks_run_to_finish() {
        let mut host = host();
        let mut events = Vec::new();
        let now = Instant::now();
        let id = host.start(simple("+."), now, &mut events).unwrap().unwrap();

        assert_eq!(host.tick(now + 5 * MS, &mut events), Ok(None));
        let mut t = now;
        for _ in 0..3 {
            t += 10 * MS;
            assert!(host.tick(t, &mut events).unwrap().is_some());
        }
        assert_eq!(host.session(id).unwrap().status(), SessionStatus::Finished);
        assert_eq!(host.next_deadline(), None);
        assert_eq!(
            events.last(),
            Some(&Event::Finished {
                cycle_count: 2,
                stdout_bytes: vec![1],
                stderr_bytes: vec![],
            })
        );
        assert_eq!(host.step(id, &mut events), Err(ProtocolError::SessionFinished(id)));
    }

    #[test]
    fn test_stop_and_restart_keep_state() {
        let mut host = host();
        let mut events = Vec::new();
        let now = Instant::now();
        let id = host.start(simple("+++++"), now, &mut events).unwrap().unwrap();

        host.tick(now + 10 * MS, &mut events).unwrap();
        host.tick(now + 20 * MS, &mut events).unwrap();
        host.stop(id).unwrap();
        let at_stop = host.session(id).unwrap().cycle_count();
        assert_eq!(at_stop, 2);

        assert_eq!(host.tick(now + 100 * MS, &mut events), Ok(None));
        assert_eq!(host.stop(id), Err(ProtocolError::InactiveSession(id)));

        host.restart(id, 50, now + 100 * MS).unwrap();
        assert_eq!(host.session(id).unwrap().cycle_count(), at_stop);
        assert_eq!(host.next_deadline(), Some(now + 150 * MS));

        events.clear();
        host.tick(now + 150 * MS, &mut events).unwrap();
        assert!(matches!(
            events[0],
            Event::Step { prog_ptr: 2, cycle_count: 2, .. }
        ));
    }

    #[test]
    fn test_breakpoint_pauses() {
        let mut host = host();
        let mut events = Vec::new();
        let now = Instant::now();
        let id = host.start(simple("@+"), now, &mut events).unwrap().unwrap();

        assert_eq!(
            host.tick(now + 10 * MS, &mut events),
            Ok(Some(StepOutcome::Break))
        );
        assert_eq!(host.session(id).unwrap().status(), SessionStatus::Paused);
        assert_eq!(host.next_deadline(), None);
        assert_eq!(host.tick(now + 20 * MS, &mut events), Ok(None));

        // Manual step still works while paused
        assert_eq!(host.step(id, &mut events), Ok(StepOutcome::Executed));
        assert_eq!(host.session(id).unwrap().status(), SessionStatus::Paused);
    }

    #[test]
    fn test_runtime_error_aborts() {
        let mut host = host();
        let mut events = Vec::new();
        let now = Instant::now();
        let id = host.start(simple("<+"), now, &mut events).unwrap().unwrap();

        let result = host.step(id, &mut events);
        assert!(matches!(
            result,
            Err(ProtocolError::Runtime(RuntimeError::OutOfRange { .. }))
        ));
        assert_eq!(host.session(id).unwrap().status(), SessionStatus::Aborted);
        assert!(matches!(events.last(), Some(Event::Error { .. })));
        assert_eq!(host.restart(id, 10, now), Err(ProtocolError::SessionFinished(id)));
        assert_eq!(host.next_deadline(), None);
    }

    #[test]
    fn test_start_discards_previous_session() {
        let mut host = host();
        let mut events = Vec::new();
        let now = Instant::now();
        let first = host.start(simple("+"), now, &mut events).unwrap().unwrap();
        let second = host.start(simple("-"), now, &mut events).unwrap().unwrap();

        assert_ne!(first, second);
        assert!(host.session(first).is_none());
        assert_eq!(host.stop(first), Err(ProtocolError::UnknownSession(first)));
        assert!(host.stop(second).is_ok());
    }

    #[test]
    fn test_batch_start() {
        let mut host = host();
        let mut events = Vec::new();
        let request = StartRequest {
            mode: Mode::Disabled,
            source: ",.".to_string(),
            eof: 0,
            input: vec![65],
            interval: 10,
        };
        assert_eq!(host.start(request, Instant::now(), &mut events), Ok(None));
        assert_eq!(
            events,
            vec![Event::Finished {
                cycle_count: 2,
                stdout_bytes: vec![65],
                stderr_bytes: vec![],
            }]
        );
        assert!(host.current().is_none());
    }

    #[test]
    fn test_unmatched_bracket_reported() {
        let mut host = host();
        let mut events = Vec::new();
        let result = host.start(simple("[["), Instant::now(), &mut events);
        assert_eq!(
            result,
            Err(ProtocolError::Runtime(RuntimeError::UnmatchedBracket { index: 1 }))
        );
        assert_eq!(
            events,
            vec![Event::Error {
                message: "Unmatched bracket at index 1".to_string()
            }]
        );
        assert!(host.current().is_none());
    }
}
