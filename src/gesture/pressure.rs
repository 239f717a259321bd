//! Force sample parsing and press edge detection
//!
//! Converts normalized force samples into press/release edges with a
//! hysteresis band between the release and press thresholds.

use crate::config::Config;

/// A single line of gesture input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputLine {
    /// Normalized force reading in 0.0..=1.0
    Force(f32),
    /// Force the press down regardless of thresholds
    Press,
    /// Lift the press regardless of thresholds
    Release,
    /// The recognizer gave up on the current press
    Cancel,
    /// Stop reading input
    Quit,
    /// Blank line
    Empty,
}

/// Errors from parsing a gesture input line
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("unrecognized input `{0}`")]
    Unrecognized(String),

    #[error("force {0} is outside 0.0..=1.0")]
    OutOfRange(f32),
}

impl InputLine {
    /// Parse one line of input
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => Ok(InputLine::Empty),
            "press" | "p" => Ok(InputLine::Press),
            "release" | "r" => Ok(InputLine::Release),
            "cancel" | "c" => Ok(InputLine::Cancel),
            "quit" | "q" | "exit" => Ok(InputLine::Quit),
            _ => {
                let force: f32 = line
                    .parse()
                    .map_err(|_| InputError::Unrecognized(line.to_string()))?;
                if !(0.0..=1.0).contains(&force) {
                    return Err(InputError::OutOfRange(force));
                }
                Ok(InputLine::Force(force))
            }
        }
    }
}

/// A change in press state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Force crossed the press threshold
    Rising,
    /// Force dropped below the release threshold
    Falling,
}

/// Tracks whether a deep press is currently held
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureTracker {
    press_threshold: f32,
    release_threshold: f32,
    pressed: bool,
}

impl PressureTracker {
    /// Create a tracker with explicit thresholds
    pub fn new(press_threshold: f32, release_threshold: f32) -> Self {
        Self {
            press_threshold,
            release_threshold,
            pressed: false,
        }
    }

    /// Create a tracker from the configured thresholds
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.press_threshold, config.release_threshold)
    }

    /// Check if a press is currently held
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed a force sample, returning an edge if the press state flipped
    pub fn update(&mut self, force: f32) -> Option<Edge> {
        if !self.pressed && force >= self.press_threshold {
            self.pressed = true;
            Some(Edge::Rising)
        } else if self.pressed && force < self.release_threshold {
            self.pressed = false;
            Some(Edge::Falling)
        } else {
            None
        }
    }

    /// Set the press state directly, returning an edge if it flipped
    pub fn set_pressed(&mut self, pressed: bool) -> Option<Edge> {
        if self.pressed == pressed {
            return None;
        }
        self.pressed = pressed;
        Some(if pressed { Edge::Rising } else { Edge::Falling })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(InputLine::parse("press"), Ok(InputLine::Press));
        assert_eq!(InputLine::parse("  R "), Ok(InputLine::Release));
        assert_eq!(InputLine::parse("cancel"), Ok(InputLine::Cancel));
        assert_eq!(InputLine::parse("q"), Ok(InputLine::Quit));
        assert_eq!(InputLine::parse(""), Ok(InputLine::Empty));
    }

    #[test]
    fn test_parse_force() {
        assert_eq!(InputLine::parse("0.8"), Ok(InputLine::Force(0.8)));
        assert_eq!(InputLine::parse("1"), Ok(InputLine::Force(1.0)));
        assert_eq!(InputLine::parse("1.2"), Err(InputError::OutOfRange(1.2)));
        assert!(matches!(
            InputLine::parse("harder"),
            Err(InputError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_rising_and_falling_edges() {
        let mut tracker = PressureTracker::new(0.75, 0.5);
        assert_eq!(tracker.update(0.3), None);
        assert_eq!(tracker.update(0.8), Some(Edge::Rising));
        assert!(tracker.is_pressed());
        assert_eq!(tracker.update(0.2), Some(Edge::Falling));
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn test_hysteresis_band_holds_state() {
        let mut tracker = PressureTracker::new(0.75, 0.5);

        // Inside the band while released: no press
        assert_eq!(tracker.update(0.6), None);
        assert!(!tracker.is_pressed());

        tracker.update(0.9);

        // Jitter inside the band while pressed: still pressed
        assert_eq!(tracker.update(0.6), None);
        assert_eq!(tracker.update(0.74), None);
        assert!(tracker.is_pressed());
    }

    #[test]
    fn test_set_pressed_is_edge_triggered() {
        let mut tracker = PressureTracker::new(0.75, 0.5);
        assert_eq!(tracker.set_pressed(true), Some(Edge::Rising));
        assert_eq!(tracker.set_pressed(true), None);
        assert_eq!(tracker.set_pressed(false), Some(Edge::Falling));
        assert_eq!(tracker.set_pressed(false), None);
    }
}
