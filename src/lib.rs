//! effect-viewer library crate.
//!
//! Captures frames, runs them through one of a set of swappable pixel
//! effects and presents the result, switching effects on operator input.
//! The binary wires these modules together; integration tests drive the
//! same types with in-memory adapters.

pub mod capture;
pub mod cli;
pub mod config;
pub mod display;
pub mod effects;
pub mod error;
pub mod event_loop;
pub mod frame;
pub mod pipeline;
pub mod settings;

pub use error::ViewerError;
