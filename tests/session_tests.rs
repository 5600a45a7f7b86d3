// Integration tests for sessions, their cadence and the JSON-lines worker

use bfstep::config::EngineConfig;
use bfstep::protocol::{
    Command, Event, Mode, ProtocolError, SessionHost, SessionStatus, StartRequest,
};
use bfstep::worker::{serve, Worker};
use std::io::Cursor;
use std::time::{Duration, Instant};

const MS: Duration = Duration::from_millis(1);

fn request(source: &str, interval: u64) -> StartRequest {
    StartRequest {
        mode: Mode::Simple,
        source: source.to_string(),
        eof: 0,
        input: Vec::new(),
        interval,
    }
}

fn step_events(events: &[Event]) -> Vec<(usize, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Step {
                prog_ptr,
                cycle_count,
                ..
            } => Some((*prog_ptr, *cycle_count)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_stop_restart_neither_repeats_nor_skips() {
    let mut host = SessionHost::new(EngineConfig::default().with_tape_len(8));
    let mut events = Vec::new();
    let t0 = Instant::now();
    let id = host
        .start(request("++++++++", 10), t0, &mut events)
        .unwrap()
        .unwrap();

    for k in 1..=3 {
        host.tick(t0 + k * 10 * MS, &mut events).unwrap();
    }
    host.stop(id).unwrap();
    let at_stop = host.session(id).unwrap().cycle_count();

    // Time passes while paused
    host.tick(t0 + 500 * MS, &mut events).unwrap();
    host.restart(id, 20, t0 + 500 * MS).unwrap();
    assert_eq!(host.session(id).unwrap().cycle_count(), at_stop);

    host.tick(t0 + 520 * MS, &mut events).unwrap();
    host.tick(t0 + 540 * MS, &mut events).unwrap();

    let steps = step_events(&events);
    let cycles: Vec<u64> = steps.iter().map(|(_, c)| *c).collect();
    assert_eq!(cycles, vec![0, 1, 2, 3, 4]);
    assert_eq!(steps[3], (3, at_stop));
}

#[test]
fn test_breakpoint_emits_one_break_then_pauses() {
    let mut host = SessionHost::default();
    let mut events = Vec::new();
    let t0 = Instant::now();
    let id = host.start(request("+@+.", 5), t0, &mut events).unwrap().unwrap();

    for k in 1..=10 {
        host.tick(t0 + k * 5 * MS, &mut events).unwrap();
    }

    assert_eq!(host.session(id).unwrap().status(), SessionStatus::Paused);
    assert_eq!(events.iter().filter(|e| matches!(e, Event::Break)).count(), 1);
    assert!(matches!(events.last(), Some(Event::Break)));

    // Resuming continues past the breakpoint without breaking again
    host.restart(id, 5, t0 + 100 * MS).unwrap();
    for k in 1..=5 {
        host.tick(t0 + 100 * MS + k * 5 * MS, &mut events).unwrap();
    }
    assert_eq!(host.session(id).unwrap().status(), SessionStatus::Finished);
    assert_eq!(events.iter().filter(|e| matches!(e, Event::Break)).count(), 1);
}

#[test]
fn test_missed_ticks_collapse() {
    let mut host = SessionHost::default();
    let mut events = Vec::new();
    let t0 = Instant::now();
    host.start(request("+++++", 10), t0, &mut events).unwrap();

    // A late host still runs a single step per tick call
    host.tick(t0 + 100 * MS, &mut events).unwrap();
    assert_eq!(step_events(&events).len(), 1);
    assert_eq!(host.next_deadline(), Some(t0 + 110 * MS));
}

#[test]
fn test_decode_errors() {
    assert_eq!(
        Command::from_json(r#"{"command":"jump"}"#),
        Err(ProtocolError::UnknownCommand("jump".to_string()))
    );
    assert_eq!(
        Command::from_json(r#"{"command":"start","mode":"turbo","source":""}"#),
        Err(ProtocolError::UnknownMode("turbo".to_string()))
    );
    assert!(matches!(
        Command::from_json("not json"),
        Err(ProtocolError::Malformed(_))
    ));
    assert_eq!(
        Command::from_json(r#"{"command":"start","mode":"disable","source":"."}"#)
            .map(|c| matches!(c, Command::Start(StartRequest { mode: Mode::Disabled, .. }))),
        Ok(true)
    );
}

#[test]
fn test_worker_keeps_serving_after_errors() {
    let mut worker = Worker::new(EngineConfig::default());
    let mut events = Vec::new();
    let now = Instant::now();

    assert!(worker.handle_line("{", now, &mut events).is_err());
    assert!(worker
        .handle_line(r#"{"command":"start","mode":"simple","source":"]"}"#, now, &mut events)
        .is_err());
    worker
        .handle_line(
            r#"{"command":"start","mode":"disabled","source":",.","input":[9]}"#,
            now,
            &mut events,
        )
        .unwrap();

    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], Event::Error { .. }));
    assert_eq!(
        events[1],
        Event::Error {
            message: "Unmatched bracket at index 0".to_string()
        }
    );
    assert_eq!(
        events[2],
        Event::Finished {
            cycle_count: 2,
            stdout_bytes: vec![9],
            stderr_bytes: vec![],
        }
    );
}

#[test]
fn test_serve_paced_session_to_completion() {
    let input = concat!(
        r#"{"command":"start","mode":"simple","source":"+.+.","interval":1}"#,
        "\n"
    );
    let mut output = Vec::new();
    serve(Cursor::new(input.as_bytes().to_vec()), &mut output, EngineConfig::default())
        .expect("serve failed");

    let events: Vec<Event> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let outputs: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Stdout { .. }))
        .collect();
    assert_eq!(outputs, vec![&Event::Stdout { byte: 1 }, &Event::Stdout { byte: 2 }]);
    assert_eq!(
        events.last(),
        Some(&Event::Finished {
            cycle_count: 4,
            stdout_bytes: vec![1, 2],
            stderr_bytes: vec![],
        })
    );
}
