//! In-memory adapters shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use effect_viewer::capture::{CaptureError, CaptureSource};
use effect_viewer::display::{Display, DisplayError, InputEvent, RawEvent};
use effect_viewer::effects::{Candidate, Effect, EffectError, EffectRegistry};
use effect_viewer::event_loop::Clock;
use effect_viewer::frame::{FrameBuffer, FrameFormat, Pixel, Resolution, Scale};

/// Lifecycle calls in the order they happened, e.g. `"start a"`.
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn tiny_format() -> FrameFormat {
    FrameFormat::new(
        Resolution {
            width: 4,
            height: 2,
        },
        Scale::Single,
    )
}

/// An effect that copies its input and records every call.
pub struct Scripted {
    name: &'static str,
    log: CallLog,
    fail_start: bool,
    fail_draw: bool,
}

impl Effect for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn start(&mut self, _format: FrameFormat) -> Result<(), EffectError> {
        self.log.borrow_mut().push(format!("start {}", self.name));
        if self.fail_start {
            return Err(EffectError::NotStarted("scripted"));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.log.borrow_mut().push(format!("stop {}", self.name));
    }

    fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> Result<(), EffectError> {
        self.log.borrow_mut().push(format!("draw {}", self.name));
        if self.fail_draw {
            return Err(EffectError::NotStarted("scripted"));
        }
        output.copy_from(input)?;
        Ok(())
    }

    fn handle_event(&mut self, event: &RawEvent) {
        self.log
            .borrow_mut()
            .push(format!("event {} {:?}", self.name, event));
    }
}

/// How a scripted candidate behaves.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub name: &'static str,
    pub decline: bool,
    pub fail_start: bool,
    pub fail_draw: bool,
}

impl Plan {
    pub fn ok(name: &'static str) -> Self {
        Self {
            name,
            decline: false,
            fail_start: false,
            fail_draw: false,
        }
    }

    pub fn declining(name: &'static str) -> Self {
        Self {
            decline: true,
            ..Self::ok(name)
        }
    }

    pub fn failing_start(name: &'static str) -> Self {
        Self {
            fail_start: true,
            ..Self::ok(name)
        }
    }

    pub fn failing_draw(name: &'static str) -> Self {
        Self {
            fail_draw: true,
            ..Self::ok(name)
        }
    }
}

pub fn candidates(plans: &[Plan], log: &CallLog) -> Vec<Candidate> {
    plans
        .iter()
        .map(|&plan| {
            let log = log.clone();
            Candidate::new(plan.name, move |_| {
                if plan.decline {
                    return None;
                }
                Some(Box::new(Scripted {
                    name: plan.name,
                    log,
                    fail_start: plan.fail_start,
                    fail_draw: plan.fail_draw,
                }) as Box<dyn Effect>)
            })
        })
        .collect()
}

pub fn registry(plans: &[Plan], log: &CallLog) -> EffectRegistry {
    EffectRegistry::register_all(candidates(plans, log), tiny_format())
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}

/// Shared simulated time.
#[derive(Clone, Default)]
pub struct FakeClock(pub Rc<Cell<Duration>>);

impl FakeClock {
    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Fills each frame with its sequence number (1, 2, 3, ...).
pub struct Counter {
    next: Pixel,
    pub fail: Rc<Cell<bool>>,
    clock: Option<(FakeClock, Duration)>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            next: 0,
            fail: Rc::default(),
            clock: None,
        }
    }

    /// Advance `clock` by `step` on every grab.
    pub fn ticking(clock: FakeClock, step: Duration) -> Self {
        Self {
            clock: Some((clock, step)),
            ..Self::new()
        }
    }
}

impl CaptureSource for Counter {
    fn describe(&self) -> String {
        "counter".to_string()
    }

    fn grab(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError> {
        if let Some((clock, step)) = &self.clock {
            clock.advance(*step);
        }
        if self.fail.get() {
            return Err(CaptureError::Timeout);
        }
        self.next += 1;
        target.fill(self.next);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Presented {
    pub address: usize,
    pub pixels: Vec<Pixel>,
}

#[derive(Default)]
pub struct Screen {
    pub presented: Vec<Presented>,
    pub captions: Vec<String>,
    /// Events returned by successive polls; empty once exhausted.
    pub script: VecDeque<Vec<InputEvent>>,
    pub polls: usize,
}

/// Display that records everything and replays scripted input.
#[derive(Clone, Default)]
pub struct MockDisplay(pub Rc<RefCell<Screen>>);

impl MockDisplay {
    pub fn scripted(script: Vec<Vec<InputEvent>>) -> Self {
        let display = Self::default();
        display.0.borrow_mut().script = script.into();
        display
    }

    pub fn presented(&self) -> Vec<Presented> {
        self.0.borrow().presented.clone()
    }

    pub fn captions(&self) -> Vec<String> {
        self.0.borrow().captions.clone()
    }
}

impl Display for MockDisplay {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        self.0.borrow_mut().presented.push(Presented {
            address: frame.pixels().as_ptr() as usize,
            pixels: frame.pixels().to_vec(),
        });
        Ok(())
    }

    fn set_caption(&mut self, caption: &str) -> Result<(), DisplayError> {
        self.0.borrow_mut().captions.push(caption.to_string());
        Ok(())
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>, DisplayError> {
        let mut screen = self.0.borrow_mut();
        screen.polls += 1;
        Ok(screen.script.pop_front().unwrap_or_default())
    }
}

/// `n` polls with no input followed by a quit.
pub fn idle_then_quit(n: usize) -> Vec<Vec<InputEvent>> {
    let mut script = vec![Vec::new(); n];
    script.push(vec![InputEvent::Quit]);
    script
}
