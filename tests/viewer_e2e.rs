//! End-to-end tests for the render loop with in-memory capture and display.

mod common;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use common::{calls, idle_then_quit, registry, tiny_format, CallLog, Counter, FakeClock, MockDisplay, Plan};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use effect_viewer::display::{map_event, InputEvent, RawEvent};
use effect_viewer::event_loop::{TickOutcome, Viewer};
use effect_viewer::frame::{FrameBuffers, ERROR_COLOR};
use effect_viewer::pipeline::{Pipeline, RunState};

fn viewer(plans: &[Plan], source: Counter, display: &MockDisplay, log: &CallLog) -> Viewer {
    let pipeline = Pipeline::new(registry(plans, log), tiny_format()).unwrap();
    let buffers = FrameBuffers::new(tiny_format()).unwrap();
    Viewer::new(pipeline, buffers, Box::new(source), Box::new(display.clone()))
}

fn all(pixels: &[u32], value: u32) -> bool {
    pixels.iter().all(|&p| p == value)
}

#[test]
fn test_quit_stops_active_effect_once_and_draws_nothing_after() {
    let log = CallLog::default();
    let display = MockDisplay::scripted(vec![
        vec![],
        vec![
            InputEvent::Quit,
            InputEvent::NavigateNext,
            InputEvent::Other(RawEvent::Char('x')),
        ],
    ]);
    let mut viewer = viewer(
        &[Plan::ok("a"), Plan::ok("b"), Plan::ok("c")],
        Counter::new(),
        &display,
        &log,
    );

    viewer.run().unwrap();

    assert_eq!(calls(&log), vec!["start a", "draw a", "draw a", "stop a"]);
    assert_eq!(display.presented().len(), 2);
    assert_eq!(viewer.pipeline().run_state(), RunState::Stopped);
}

#[test]
fn test_frame_rate_caption_after_one_window() {
    let log = CallLog::default();
    let clock = FakeClock::default();
    let display = MockDisplay::scripted(idle_then_quit(99));
    let source = Counter::ticking(clock.clone(), Duration::from_millis(10));
    let mut viewer = viewer(&[Plan::ok("a")], source, &display, &log)
        .with_frame_rate(true)
        .with_clock(Box::new(clock.clone()));

    viewer.run().unwrap();

    assert_eq!(display.presented().len(), 100);
    assert_eq!(display.captions(), vec!["a", "a (100.00 fps)"]);
}

#[test]
fn test_frame_rate_caption_is_off_by_default() {
    let log = CallLog::default();
    let display = MockDisplay::scripted(idle_then_quit(150));
    let mut viewer = viewer(&[Plan::ok("a")], Counter::new(), &display, &log);

    viewer.run().unwrap();

    assert_eq!(display.captions(), vec!["a"]);
}

#[test]
fn test_frames_are_presented_in_capture_order() {
    let log = CallLog::default();
    let display = MockDisplay::scripted(idle_then_quit(5));
    let mut viewer = viewer(&[Plan::ok("a")], Counter::new(), &display, &log);

    viewer.run().unwrap();

    let presented = display.presented();
    assert_eq!(presented.len(), 6);
    for (i, frame) in presented.iter().enumerate() {
        assert!(all(&frame.pixels, i as u32 + 1), "frame {} out of order", i);
    }
}

#[test]
fn test_presented_buffer_never_aliases_capture_buffers() {
    let log = CallLog::default();
    let display = MockDisplay::default();
    let mut viewer = viewer(&[Plan::ok("a")], Counter::new(), &display, &log);
    viewer.start().unwrap();

    for _ in 0..8 {
        assert_eq!(viewer.tick().unwrap(), TickOutcome::Continue);
        let front = display.presented().last().unwrap().address;
        let stable = viewer.buffers().stable().pixels().as_ptr() as usize;
        assert_ne!(front, stable);
    }

    // Consecutive presents alternate between the two output buffers.
    let addresses: Vec<usize> = display.presented().iter().map(|p| p.address).collect();
    for pair in addresses.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    for pair in addresses.windows(3) {
        assert_eq!(pair[0], pair[2]);
    }
}

#[test]
fn test_draw_failure_shows_error_colour_until_navigation() {
    let log = CallLog::default();
    let display = MockDisplay::scripted(vec![
        vec![],
        vec![],
        vec![InputEvent::NavigateNext],
        vec![InputEvent::Quit],
    ]);
    let mut viewer = viewer(
        &[Plan::failing_draw("a"), Plan::ok("b")],
        Counter::new(),
        &display,
        &log,
    );

    viewer.run().unwrap();

    let presented = display.presented();
    assert_eq!(presented.len(), 4);
    for frame in &presented[..3] {
        assert!(all(&frame.pixels, ERROR_COLOR));
    }
    assert!(all(&presented[3].pixels, 4));
    assert_eq!(
        calls(&log),
        vec!["start a", "draw a", "stop a", "start b", "draw b", "stop b"]
    );
    assert_eq!(display.captions(), vec!["a", "b"]);
}

#[test]
fn test_unavailable_effect_stays_navigable() {
    let log = CallLog::default();
    let display = MockDisplay::scripted(vec![
        vec![InputEvent::NavigateNext],
        vec![InputEvent::NavigatePrevious],
        vec![InputEvent::Quit],
    ]);
    let mut viewer = viewer(
        &[Plan::ok("a"), Plan::failing_start("b")],
        Counter::new(),
        &display,
        &log,
    );

    viewer.run().unwrap();

    let presented = display.presented();
    assert!(all(&presented[0].pixels, 1));
    assert!(all(&presented[1].pixels, ERROR_COLOR));
    assert!(all(&presented[2].pixels, 3));
    assert_eq!(
        calls(&log),
        vec!["start a", "draw a", "stop a", "start b", "start a", "draw a", "stop a"]
    );
    assert_eq!(display.captions(), vec!["a", "b (not available)", "a"]);
}

#[test]
fn test_unrecognised_input_reaches_active_effect() {
    let log = CallLog::default();
    let display = MockDisplay::scripted(vec![
        vec![
            InputEvent::Other(RawEvent::Char('+')),
            InputEvent::Other(RawEvent::Resize {
                columns: 80,
                rows: 24,
            }),
        ],
        vec![InputEvent::Quit],
    ]);
    let mut viewer = viewer(&[Plan::ok("a")], Counter::new(), &display, &log);

    viewer.run().unwrap();

    let log = calls(&log);
    assert!(log.contains(&"event a Char('+')".to_string()));
    assert!(log.contains(&"event a Resize { columns: 80, rows: 24 }".to_string()));
}

#[test]
fn test_chords_and_unnamed_keys_reach_active_effect() {
    let log = CallLog::default();
    let ctrl_x = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
    let page_up = Event::Key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE));
    let script: Vec<InputEvent> = [ctrl_x, page_up].iter().filter_map(map_event).collect();
    assert_eq!(script.len(), 2);

    let display = MockDisplay::scripted(vec![script, vec![InputEvent::Quit]]);
    let mut viewer = viewer(&[Plan::ok("a")], Counter::new(), &display, &log);

    viewer.run().unwrap();

    let forwarded: Vec<String> = calls(&log)
        .into_iter()
        .filter(|call| call.starts_with("event a Key"))
        .collect();
    assert_eq!(forwarded.len(), 2);
    assert!(forwarded[0].contains("Char('x')"));
    assert!(forwarded[0].contains("CONTROL"));
    assert!(forwarded[1].contains("PageUp"));
}

#[test]
fn test_shutdown_flag_quits_at_tick_boundary() {
    let log = CallLog::default();
    let display = MockDisplay::default();
    let flag = Arc::new(AtomicBool::new(true));
    let mut viewer = viewer(&[Plan::ok("a")], Counter::new(), &display, &log)
        .with_shutdown_flag(flag);

    viewer.run().unwrap();

    assert_eq!(calls(&log), vec!["start a", "draw a", "stop a"]);
    assert_eq!(display.0.borrow().polls, 0);
}

#[test]
fn test_capture_failure_falls_back_to_error_colour() {
    let log = CallLog::default();
    let display = MockDisplay::default();
    let source = Counter::new();
    let fail = source.fail.clone();
    let mut viewer = viewer(&[Plan::ok("a")], source, &display, &log);
    viewer.start().unwrap();

    viewer.tick().unwrap();
    fail.set(true);
    viewer.tick().unwrap();
    assert_eq!(viewer.pipeline().run_state(), RunState::ErrorFallback);
    fail.set(false);
    viewer.tick().unwrap();

    let presented = display.presented();
    assert!(all(&presented[0].pixels, 1));
    assert!(all(&presented[1].pixels, ERROR_COLOR));
    assert!(all(&presented[2].pixels, ERROR_COLOR));
    assert_eq!(calls(&log), vec!["start a", "draw a"]);
}
