//! Effect-switching state machine.
//!
//! [`Pipeline`] owns the registry and tracks which effect is active. Every
//! lifecycle call on an effect goes through here, which keeps the order
//! `start -> draw* -> stop` intact across switches, failures and shutdown.

use crate::display::RawEvent;
use crate::effects::EffectRegistry;
use crate::error::ViewerError;
use crate::frame::{FrameBuffer, FrameFormat};

/// What the render loop should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The active effect draws every tick.
    Running,
    /// The error colour is shown instead; no draw calls until the next switch.
    ErrorFallback,
    /// No effect is started.
    Stopped,
}

/// Result of one draw cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Ok,
    Failed,
}

/// Result of a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Started,
    /// `start` failed. The index is still current so the operator can move on.
    Unavailable,
}

/// Active-effect bookkeeping for one viewer session.
#[derive(Debug)]
pub struct Pipeline {
    registry: EffectRegistry,
    format: FrameFormat,
    active_index: usize,
    started: bool,
    run_state: RunState,
}

impl Pipeline {
    /// # Errors
    /// * `ViewerError::NoEffects` - If every candidate declined
    pub fn new(registry: EffectRegistry, format: FrameFormat) -> Result<Self, ViewerError> {
        if registry.is_empty() {
            return Err(ViewerError::NoEffects);
        }
        Ok(Self {
            registry,
            format,
            active_index: 0,
            started: false,
            run_state: RunState::Stopped,
        })
    }

    /// Start the first registered effect.
    pub fn start(&mut self) -> SwitchOutcome {
        self.switch_to(0)
    }

    /// Stop the current effect and start the one at `index`.
    ///
    /// `index` wraps around the registry in both directions, so `-1` is the
    /// last effect.
    pub fn switch_to(&mut self, index: isize) -> SwitchOutcome {
        self.stop_active();

        let count = self.registry.len() as isize;
        self.active_index = index.rem_euclid(count) as usize;

        let format = self.format;
        let Some(effect) = self.registry.effect_mut(self.active_index) else {
            self.run_state = RunState::ErrorFallback;
            return SwitchOutcome::Unavailable;
        };
        match effect.start(format) {
            Ok(()) => {
                self.started = true;
                self.run_state = RunState::Running;
                log::info!("switched to {}", self.active_name());
                SwitchOutcome::Started
            }
            Err(e) => {
                log::warn!("{} is not available: {}", self.active_name(), e);
                self.run_state = RunState::ErrorFallback;
                SwitchOutcome::Unavailable
            }
        }
    }

    pub fn next(&mut self) -> SwitchOutcome {
        self.switch_to(self.active_index as isize + 1)
    }

    pub fn previous(&mut self) -> SwitchOutcome {
        self.switch_to(self.active_index as isize - 1)
    }

    /// Run the active effect once.
    ///
    /// Only calls `draw` while [`RunState::Running`]. A draw error moves the
    /// pipeline to [`RunState::ErrorFallback`].
    pub fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> FrameStatus {
        if self.run_state != RunState::Running {
            return FrameStatus::Failed;
        }
        let Some(effect) = self.registry.effect_mut(self.active_index) else {
            return FrameStatus::Failed;
        };
        match effect.draw(input, output) {
            Ok(()) => FrameStatus::Ok,
            Err(e) => {
                log::warn!("{} failed to draw: {}", self.active_name(), e);
                self.run_state = RunState::ErrorFallback;
                FrameStatus::Failed
            }
        }
    }

    /// Record a failed tick that happened outside the effect, such as a
    /// capture error.
    pub fn fail(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::ErrorFallback;
        }
    }

    /// Pass input the loop didn't consume to the active effect.
    pub fn forward_event(&mut self, event: &RawEvent) {
        if !self.started {
            return;
        }
        if let Some(effect) = self.registry.effect_mut(self.active_index) {
            effect.handle_event(event);
        }
    }

    /// Stop the active effect. Further calls are no-ops.
    pub fn shutdown(&mut self) {
        self.stop_active();
        self.run_state = RunState::Stopped;
    }

    fn stop_active(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        if let Some(effect) = self.registry.effect_mut(self.active_index) {
            effect.stop();
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_name(&self) -> &str {
        self.registry.name(self.active_index).unwrap_or_default()
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Whether the active effect has been started and not yet stopped.
    pub fn is_started(&self) -> bool {
        self.started
    }

}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop_active();
    }
}
