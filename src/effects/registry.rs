//! Effect registry built once at startup.

use std::fmt;

use super::Effect;
use crate::frame::FrameFormat;

/// Names longer than this are truncated in the registry.
pub const MAX_NAME_LEN: usize = 40;

type Probe = Box<dyn FnOnce(FrameFormat) -> Option<Box<dyn Effect>>>;

/// A possible effect: constructs it, or declines by returning `None`.
pub struct Candidate {
    label: &'static str,
    probe: Probe,
}

impl Candidate {
    pub fn new<F>(label: &'static str, probe: F) -> Self
    where
        F: FnOnce(FrameFormat) -> Option<Box<dyn Effect>> + 'static,
    {
        Self {
            label,
            probe: Box::new(probe),
        }
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

struct Entry {
    name: String,
    effect: Box<dyn Effect>,
}

/// Ordered catalogue of the effects that accepted the frame format.
///
/// Indices are stable for the life of the registry and follow candidate
/// order.
#[derive(Default)]
pub struct EffectRegistry {
    entries: Vec<Entry>,
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl EffectRegistry {
    /// Probe every candidate in order and keep those that accept `format`.
    ///
    /// Declines are not errors. An empty result is left for the caller to
    /// treat as fatal.
    pub fn register_all<I>(candidates: I, format: FrameFormat) -> Self
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut entries = Vec::new();
        for candidate in candidates {
            let label = candidate.label;
            match (candidate.probe)(format) {
                Some(effect) => {
                    let name = bounded_name(effect.name());
                    log::info!("{} OK.", name);
                    entries.push(Entry { name, effect });
                }
                None => log::debug!("{} declined {}", label, format),
            }
        }
        log::info!("{} effects are available.", entries.len());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered name at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub(crate) fn effect_mut(&mut self, index: usize) -> Option<&mut (dyn Effect + 'static)> {
        self.entries.get_mut(index).map(|e| e.effect.as_mut())
    }
}

fn bounded_name(name: &str) -> String {
    name.chars().take(MAX_NAME_LEN).collect()
}
