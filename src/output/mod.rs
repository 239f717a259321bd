//! Output module: presentation and feedback capabilities
//!
//! The sequencer only talks to these traits. The console implementations
//! render the label as lines on stdout and pulses as the terminal bell.

mod console;

use std::time::Duration;

pub use console::{BellFeedback, ConsolePresenter};

/// Something that can put the hint label on screen
pub trait Presenter {
    /// Replace the label text without changing its opacity
    fn show(&mut self, text: &str);

    /// Start animating the label to `opacity` after `delay`, over `duration`.
    ///
    /// Returns immediately; the caller schedules its own continuation for
    /// `delay + duration` to learn that the fade finished.
    fn fade_to(&mut self, opacity: f32, duration: Duration, delay: Duration);

    /// Toggle the glitch effect on the main label
    fn set_glitch_mode(&mut self, enabled: bool);

    /// Fade the label out over `duration`, then drop its text.
    ///
    /// The text stays visible until the fade has finished; no completion
    /// is reported back to the caller.
    fn fade_out_and_clear(&mut self, duration: Duration);

    /// Hide all transient state and show the terminal view
    fn reveal_farewell(&mut self, text: &str);
}

/// Fire-and-forget haptic or alert trigger
pub trait Feedback {
    fn pulse(&mut self);
}
