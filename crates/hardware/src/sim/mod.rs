//! Simulation utilities and program loading.
//!
//! Provides the image loader and the [`Simulator`] run loop that drives the
//! CPU until it halts, idles or is stopped.

pub mod loader;

/// Run loop and stop handling.
pub mod simulator;

pub use simulator::{RunExit, Simulator};
