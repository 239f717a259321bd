//! The narrative: stage texts, hint and farewell

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::STAGE_COUNT;

/// One message shown while a press is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub text: &'static str,
    /// Time spent at full opacity before fading out
    pub hold: Duration,
}

/// Stage texts in the order they are presented
pub const STAGE_TEXTS: [&str; STAGE_COUNT] = [
    "hold for a while",
    "almost there",
    "hypnotic, isn't it?",
];

/// Pair each stage text with its configured hold
pub fn stages(holds: &[Duration; STAGE_COUNT]) -> Vec<Stage> {
    STAGE_TEXTS
        .iter()
        .zip(holds)
        .map(|(&text, &hold)| Stage { text, hold })
        .collect()
}

/// Shown once when the view first appears
pub const HINT_TEXT: &str = "press firmly, and hold";

/// Names the farewell may address
pub const FAREWELL_NAMES: [&str; 5] = [
    "alligator",
    "crocodile",
    "space cowboy",
    "glitch",
    "friend",
];

/// Completion pulses fired on the interval after the immediate one
pub const COMPLETION_PULSES: u32 = 2;

/// Build the terminal view text with a uniformly picked name
pub fn farewell<R: Rng + ?Sized>(rng: &mut R) -> String {
    let name = FAREWELL_NAMES.choose(rng).copied().unwrap_or("friend");
    format!("see you later, {}", name)
}
