//! Fade-out coordination for the lumen core
//!
//! This crate orchestrates a single fade-out request: snapshot the
//! device's current settings, record the fade window, resolve group
//! proxies into their members, and delegate hardware-timed transitions.
//! The coordinator never waits for a fade to physically complete; it is
//! fire-and-forget from the caller's perspective.

mod coordinator;
mod resolver;

pub use coordinator::{
    FadeCoordinator, FadeError, FadeOutcome, FadeReport, TargetOutcome, TargetStatus,
    DEFAULT_FADE_BUFFER, DIM_OFF_THRESHOLD,
};
pub use resolver::resolve_targets;
