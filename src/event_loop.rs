//! Render loop: one capture -> draw -> present -> input pass per tick.
//!
//! The loop is single threaded and never blocks on anything but the capture
//! source. Effect switches and quits only take effect between ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::capture::CaptureSource;
use crate::display::{Display, InputEvent};
use crate::error::ViewerError;
use crate::frame::{FrameBuffers, ERROR_COLOR};
use crate::pipeline::{FrameStatus, Pipeline, RunState, SwitchOutcome};

/// Ticks between two throughput readings.
pub const FRAME_RATE_WINDOW: u32 = 100;

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Counts ticks and reports ticks per second once per window.
///
/// The clock is only read at window boundaries.
#[derive(Debug, Clone)]
pub struct FrameRateMeter {
    window: u32,
    ticks: u32,
    last: Duration,
}

impl FrameRateMeter {
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            ticks: 0,
            last: Duration::ZERO,
        }
    }

    pub fn reset(&mut self, now: Duration) {
        self.ticks = 0;
        self.last = now;
    }

    /// Count one tick. Returns the rate when a window completes.
    pub fn tick(&mut self, clock: &dyn Clock) -> Option<f64> {
        self.ticks += 1;
        if self.ticks < self.window {
            return None;
        }
        let now = clock.now();
        let elapsed = now.saturating_sub(self.last);
        self.reset(now);
        if elapsed.is_zero() {
            return None;
        }
        Some(f64::from(self.window) / elapsed.as_secs_f64())
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(FRAME_RATE_WINDOW)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// The viewer session: pipeline, buffers and both adapters.
pub struct Viewer {
    pipeline: Pipeline,
    buffers: FrameBuffers,
    source: Box<dyn CaptureSource>,
    display: Box<dyn Display>,
    clock: Box<dyn Clock>,
    meter: Option<FrameRateMeter>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("pipeline", &self.pipeline)
            .field("source", &self.source.describe())
            .field("meter", &self.meter)
            .finish_non_exhaustive()
    }
}

impl Viewer {
    pub fn new(
        pipeline: Pipeline,
        buffers: FrameBuffers,
        source: Box<dyn CaptureSource>,
        display: Box<dyn Display>,
    ) -> Self {
        Self {
            pipeline,
            buffers,
            source,
            display,
            clock: Box::new(SystemClock::default()),
            meter: None,
            shutdown: None,
        }
    }

    /// Show the measured frame rate in the caption.
    pub fn with_frame_rate(mut self, enabled: bool) -> Self {
        self.meter = enabled.then(FrameRateMeter::default);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Quit at the next tick boundary once `flag` is set.
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    /// Start the first effect and tick until a quit. The active effect is
    /// stopped before returning, on error too.
    ///
    /// # Errors
    /// * `ViewerError::Display` - If presenting, captioning or polling fails
    pub fn run(&mut self) -> Result<(), ViewerError> {
        let result = self.start().and_then(|()| loop {
            match self.tick() {
                Ok(TickOutcome::Continue) => {}
                Ok(TickOutcome::Quit) => break Ok(()),
                Err(e) => break Err(e),
            }
        });

        self.pipeline.shutdown();
        log::info!(
            "{} frames captured, {} presented",
            self.buffers.captured(),
            self.buffers.presented()
        );
        result
    }

    /// Start the first registered effect and caption it.
    pub fn start(&mut self) -> Result<(), ViewerError> {
        if let Some(meter) = &mut self.meter {
            meter.reset(self.clock.now());
        }
        let outcome = self.pipeline.start();
        self.update_caption(outcome)
    }

    /// One iteration of the loop.
    ///
    /// # Errors
    /// * `ViewerError::Display` - If the display fails
    pub fn tick(&mut self) -> Result<TickOutcome, ViewerError> {
        self.render();
        self.buffers
            .present(self.display.as_mut())
            .map_err(ViewerError::Display)?;

        if let Some(meter) = &mut self.meter {
            if let Some(rate) = meter.tick(self.clock.as_ref()) {
                log::debug!("{:.2} fps", rate);
                let caption = format!("{} ({:.2} fps)", self.pipeline.active_name(), rate);
                self.display
                    .set_caption(&caption)
                    .map_err(ViewerError::Display)?;
            }
        }

        if self.shutdown_requested() {
            return Ok(TickOutcome::Quit);
        }
        let events = self.display.poll_events().map_err(ViewerError::Display)?;
        for event in events {
            match event {
                InputEvent::Quit => return Ok(TickOutcome::Quit),
                InputEvent::NavigatePrevious => {
                    let outcome = self.pipeline.previous();
                    self.update_caption(outcome)?;
                }
                InputEvent::NavigateNext => {
                    let outcome = self.pipeline.next();
                    self.update_caption(outcome)?;
                }
                InputEvent::Other(raw) => self.pipeline.forward_event(&raw),
            }
        }
        Ok(TickOutcome::Continue)
    }

    /// Fill the output buffer for this tick.
    fn render(&mut self) {
        let captured = self.buffers.capture(self.source.as_mut()).map(|_| ());
        if let Err(e) = captured {
            if self.pipeline.run_state() == RunState::Running {
                log::warn!("capture failed: {}", e);
                self.pipeline.fail();
            } else {
                log::debug!("capture failed: {}", e);
            }
        }

        let status = match self.pipeline.run_state() {
            RunState::Running => {
                let (input, output) = self.buffers.frames();
                self.pipeline.draw(input, output)
            }
            RunState::ErrorFallback | RunState::Stopped => FrameStatus::Failed,
        };
        if status == FrameStatus::Failed {
            self.buffers.fill_output(ERROR_COLOR);
        }
    }

    fn update_caption(&mut self, outcome: SwitchOutcome) -> Result<(), ViewerError> {
        let name = self.pipeline.active_name();
        let caption = match outcome {
            SwitchOutcome::Started => name.to_string(),
            SwitchOutcome::Unavailable => format!("{} (not available)", name),
        };
        self.display
            .set_caption(&caption)
            .map_err(ViewerError::Display)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Install a Ctrl+C handler and return the flag it sets.
///
/// Call once at startup. In raw terminal mode Ctrl+C arrives as a key
/// instead; this covers signals sent from outside.
pub fn setup_ctrlc_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })?;
    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeClock(Rc<Cell<Duration>>);

    impl Clock for FakeClock {
        fn now(&self) -> Duration {
            self.0.get()
        }
    }

    #[test]
    fn test_meter_reports_once_per_window() {
        let time = Rc::new(Cell::new(Duration::ZERO));
        let clock = FakeClock(time.clone());
        let mut meter = FrameRateMeter::new(4);
        meter.reset(Duration::ZERO);

        for _ in 0..3 {
            time.set(time.get() + Duration::from_millis(50));
            assert_eq!(meter.tick(&clock), None);
        }
        time.set(time.get() + Duration::from_millis(50));
        let rate = meter.tick(&clock).unwrap();
        assert!((rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_meter_hundred_ticks_in_one_second() {
        let time = Rc::new(Cell::new(Duration::ZERO));
        let clock = FakeClock(time.clone());
        let mut meter = FrameRateMeter::default();
        meter.reset(Duration::ZERO);
        let mut readings = Vec::new();
        for _ in 0..FRAME_RATE_WINDOW {
            time.set(time.get() + Duration::from_millis(10));
            readings.extend(meter.tick(&clock));
        }
        assert_eq!(readings.len(), 1);
        assert_eq!(format!("{:.2}", readings[0]), "100.00");
    }

    #[test]
    fn test_meter_skips_zero_elapsed() {
        let clock = FakeClock(Rc::new(Cell::new(Duration::from_secs(3))));
        let mut meter = FrameRateMeter::new(1);
        meter.reset(Duration::from_secs(3));
        assert_eq!(meter.tick(&clock), None);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let clock = FakeClock(Rc::new(Cell::new(Duration::from_secs(1))));
        let mut meter = FrameRateMeter::new(0);
        assert_eq!(meter.tick(&clock), Some(1.0));
    }
}
