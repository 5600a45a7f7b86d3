//! Main TUI application state and logic

use crate::config::EngineConfig;
use crate::interpreter::StepOutcome;
use crate::program::{Dialect, Program};
use crate::protocol::{ProtocolError, SessionHost, SessionId, SessionStatus, StartRequest};
use crate::ui::theme::DEFAULT_THEME;
use crate::ui::view::DebugView;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const MIN_INTERVAL_MS: u64 = 1;
const MAX_INTERVAL_MS: u64 = 5000;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Tape,
    Stdout,
    Stderr,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> stdout -> stderr -> tape)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Stdout,
            FocusedPane::Stdout => FocusedPane::Stderr,
            FocusedPane::Stderr => FocusedPane::Tape,
            FocusedPane::Tape => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// Drives the stepped session; the app owns the cadence loop
    host: SessionHost,

    /// Handle of the current session, `None` if the last start failed
    session: Option<SessionId>,

    /// The request used for `r` (fresh start)
    request: StartRequest,

    /// Non-comment characters in the program
    instruction_count: usize,

    /// Everything the panes show, rebuilt from events
    pub view: DebugView,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub tape_scroll: usize,
    pub stdout_scroll: usize,
    pub stderr_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create the app; the session starts paused so the first frame shows pc 0
    pub fn new(request: StartRequest, config: EngineConfig) -> Self {
        let mut app = App {
            host: SessionHost::new(config),
            session: None,
            instruction_count: Program::new(&request.source).instruction_count(Dialect::Extended),
            request,
            view: DebugView::new(),
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            tape_scroll: 0,
            stdout_scroll: 0,
            stderr_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready! Press space to run"),
        };
        app.reload(false);
        app
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.tick(Instant::now());

            // Wake up for the next tick or after 50ms, whichever is first
            let mut timeout = Duration::from_millis(50);
            if let Some(deadline) = self.host.next_deadline() {
                timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
            }

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Advance the paced session if a tick is due
    pub fn tick(&mut self, now: Instant) {
        match self.host.tick(now, &mut self.view) {
            Ok(Some(outcome)) => self.after_step(outcome),
            Ok(None) => {}
            Err(e) => self.report(e),
        }
    }

    /// Discard the current session and load the program again
    fn reload(&mut self, run: bool) {
        self.view = DebugView::new();
        self.stdout_scroll = 0;
        self.stderr_scroll = 0;

        match self
            .host
            .start(self.request.clone(), Instant::now(), &mut self.view)
        {
            Ok(Some(id)) => {
                self.session = Some(id);
                if !run {
                    let _ = self.host.stop(id);
                }
                // Show the initial state without executing anything
                self.view.tape = vec![0; self.host_tape_len()];
                self.status_message = if run {
                    "Running...".to_string()
                } else {
                    "Loaded".to_string()
                };
            }
            Ok(None) => self.session = None,
            Err(e) => {
                self.session = None;
                self.status_message = format!("Cannot start: {}", e);
            }
        }
    }

    fn host_tape_len(&self) -> usize {
        self.session
            .and_then(|id| self.host.session(id))
            .map(|s| s.engine().machine().tape().len())
            .unwrap_or(0)
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.session
            .and_then(|id| self.host.session(id))
            .map(|s| s.status())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Create layout: 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Tape (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        // Right column: Stdout (top) | Stderr (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        super::panes::render_source_pane(
            frame,
            left_rows[0],
            &self.request.source,
            self.view.prog_ptr,
            self.instruction_count,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_tape_pane(
            frame,
            left_rows[1],
            &self.view.tape,
            self.view.data_ptr,
            self.focused_pane == FocusedPane::Tape,
            &mut self.tape_scroll,
        );

        super::panes::render_output_pane(
            frame,
            right_rows[0],
            "Stdout",
            &self.view.stdout,
            DEFAULT_THEME.fg,
            self.focused_pane == FocusedPane::Stdout,
            &mut self.stdout_scroll,
        );

        super::panes::render_output_pane(
            frame,
            right_rows[1],
            "Stderr",
            &self.view.stderr,
            DEFAULT_THEME.secondary,
            self.focused_pane == FocusedPane::Stderr,
            &mut self.stderr_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.view.cycle_count,
            self.request.interval,
            self.status(),
            self.view.error.is_some(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('s') | KeyCode::Right => self.step(),
            KeyCode::Char(' ') => self.toggle_running(),
            KeyCode::Char('r') => self.reload(false),
            KeyCode::Char('+') => self.set_interval(self.request.interval / 2),
            KeyCode::Char('-') => self.set_interval(self.request.interval * 2),
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => self.source_scroll = self.source_scroll.saturating_sub(1),
                FocusedPane::Tape => self.tape_scroll = self.tape_scroll.saturating_sub(1),
                FocusedPane::Stdout => self.stdout_scroll = self.stdout_scroll.saturating_sub(1),
                FocusedPane::Stderr => self.stderr_scroll = self.stderr_scroll.saturating_sub(1),
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => self.source_scroll = self.source_scroll.saturating_add(1),
                FocusedPane::Tape => self.tape_scroll = self.tape_scroll.saturating_add(1),
                FocusedPane::Stdout => self.stdout_scroll = self.stdout_scroll.saturating_add(1),
                FocusedPane::Stderr => self.stderr_scroll = self.stderr_scroll.saturating_add(1),
            },
            _ => {}
        }
    }

    /// Execute one instruction on demand
    fn step(&mut self) {
        let Some(id) = self.session else {
            return;
        };
        match self.host.step(id, &mut self.view) {
            Ok(StepOutcome::Executed) => {
                self.after_step(StepOutcome::Executed);
                self.status_message = "Stepped".to_string();
            }
            Ok(outcome) => self.after_step(outcome),
            Err(ProtocolError::SessionFinished(_)) => {
                self.status_message = "Program has finished; press r to reload".to_string();
            }
            Err(e) => self.report(e),
        }
    }

    fn toggle_running(&mut self) {
        let Some(id) = self.session else {
            return;
        };
        let result = match self.status() {
            Some(SessionStatus::Stepping) => self.host.stop(id).map(|_| "Paused"),
            Some(SessionStatus::Finished) | Some(SessionStatus::Aborted) => {
                self.reload(true);
                return;
            }
            _ => self
                .host
                .restart(id, self.request.interval, Instant::now())
                .map(|_| "Running..."),
        };
        match result {
            Ok(message) => self.status_message = message.to_string(),
            Err(e) => self.status_message = format!("Error: {}", e),
        }
    }

    fn set_interval(&mut self, interval_ms: u64) {
        self.request.interval = interval_ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
        if let (Some(id), Some(SessionStatus::Stepping)) = (self.session, self.status()) {
            let _ = self
                .host
                .restart(id, self.request.interval, Instant::now());
        }
        self.status_message = format!("Interval {}ms", self.request.interval);
    }

    /// Update the status line and scroll outputs after the session moved
    fn after_step(&mut self, outcome: StepOutcome) {
        if let Some(session) = self.session.and_then(|id| self.host.session(id)) {
            self.view.sync(session.engine().machine());
        }
        self.stdout_scroll = usize::MAX;
        self.stderr_scroll = usize::MAX;
        match outcome {
            StepOutcome::Break => {
                // pc has already moved past the `@`
                self.status_message =
                    format!("Breakpoint at pc {}", self.view.prog_ptr.saturating_sub(1));
            }
            StepOutcome::Finished => self.status_message = "Program finished".to_string(),
            StepOutcome::Executed => {}
        }
    }

    fn report(&mut self, e: ProtocolError) {
        self.status_message = match &self.view.error {
            Some(message) => format!("Aborted: {}", message),
            None => format!("Error: {}", e),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Mode;
    use crossterm::event::KeyModifiers;

    fn app(source: &str) -> App {
        let request = StartRequest {
            mode: Mode::Simple,
            source: source.to_string(),
            eof: 0,
            input: Vec::new(),
            interval: 10,
        };
        App::new(request, EngineConfig::default().with_tape_len(4))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_loads_paused() {
        let app = app("+.");
        assert_eq!(app.status(), Some(SessionStatus::Paused));
        assert_eq!(app.view.tape, vec![0; 4]);
        assert_eq!(app.view.cycle_count, 0);
    }

    #[test]
    fn test_manual_steps_to_end() {
        let mut app = app("+.");
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('s'));
        }
        assert!(app.view.finished);
        assert_eq!(app.view.stdout, vec![1]);
        // The tape shows the state after the last instruction
        assert_eq!(app.view.tape, vec![1, 0, 0, 0]);
        assert_eq!(app.view.prog_ptr, 2);
        assert_eq!(app.status(), Some(SessionStatus::Finished));

        press(&mut app, KeyCode::Char('s'));
        assert!(app.status_message.contains("finished"));
    }

    #[test]
    fn test_step_highlights_next_instruction() {
        let mut app = app("+>+");
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.view.prog_ptr, 1);
        assert_eq!(app.view.cycle_count, 1);
        assert_eq!(app.view.tape[0], 1);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.view.data_ptr, 1);
    }

    #[test]
    fn test_space_toggles_pacing() {
        let mut app = app("+++");
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.status(), Some(SessionStatus::Stepping));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.status(), Some(SessionStatus::Paused));
    }

    #[test]
    fn test_breakpoint_message() {
        let mut app = app("@+");
        press(&mut app, KeyCode::Right);
        assert_eq!(app.view.breaks, 1);
        assert_eq!(app.status_message, "Breakpoint at pc 0");
    }

    #[test]
    fn test_runtime_error_aborts() {
        let mut app = app("<");
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.status(), Some(SessionStatus::Aborted));
        assert!(app.status_message.starts_with("Aborted: "));

        // Space reloads a dead session and runs it again
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.status(), Some(SessionStatus::Stepping));
        assert!(app.view.error.is_none());
    }

    #[test]
    fn test_bad_program_reports() {
        let app = app("[");
        assert_eq!(app.status(), None);
        assert!(app.status_message.starts_with("Cannot start"));
        assert!(app.view.error.is_some());
    }

    #[test]
    fn test_interval_clamped() {
        let mut app = app("+");
        for _ in 0..20 {
            press(&mut app, KeyCode::Char('-'));
        }
        assert_eq!(app.request.interval, MAX_INTERVAL_MS);
        for _ in 0..20 {
            press(&mut app, KeyCode::Char('+'));
        }
        assert_eq!(app.request.interval, MIN_INTERVAL_MS);
    }
}
