//! Gesture module for force-touch input
//!
//! Turns pressure samples read from stdin into press begin/end events
//! for the sequencer.

mod listener;
mod pressure;

pub use listener::{GestureEvent, GestureListener};
pub use pressure::PressureTracker;
