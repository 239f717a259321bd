//! Terminal implementations of the output capabilities

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Feedback, Presenter};

const GLITCH_GLYPHS: [char; 4] = ['▓', '▒', '░', '█'];

/// Renders the hint label as lines of text
pub struct ConsolePresenter<W: Write> {
    out: W,
    text: String,
    opacity: f32,
    glitching: bool,
}

impl<W: Write> ConsolePresenter<W> {
    /// Create a new presenter writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            text: String::new(),
            opacity: 0.0,
            glitching: false,
        }
    }

    /// Consume the presenter, returning the writer
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!(?e, "failed to write label");
        }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn show(&mut self, text: &str) {
        self.text = text.to_string();
        if self.opacity > 0.0 && !self.text.is_empty() {
            let line = render(&self.text, self.glitching);
            self.write_line(&line);
        }
    }

    fn fade_to(&mut self, opacity: f32, duration: Duration, delay: Duration) {
        debug!(
            opacity,
            duration_ms = duration.as_millis() as u64,
            delay_ms = delay.as_millis() as u64,
            "fade"
        );
        let appearing = self.opacity == 0.0 && opacity > 0.0;
        self.opacity = opacity;
        if appearing && !self.text.is_empty() {
            let line = render(&self.text, self.glitching);
            self.write_line(&line);
        }
    }

    fn fade_out_and_clear(&mut self, duration: Duration) {
        debug!(duration_ms = duration.as_millis() as u64, "fade out and clear");
        // Lines already printed stay put, so there is nothing to animate
        self.opacity = 0.0;
        self.text.clear();
    }

    fn set_glitch_mode(&mut self, enabled: bool) {
        if self.glitching != enabled {
            info!(enabled, "glitch mode");
        }
        self.glitching = enabled;
    }

    fn reveal_farewell(&mut self, text: &str) {
        self.text.clear();
        self.opacity = 0.0;
        self.glitching = false;
        self.write_line(&format!("== {} ==", text));
    }
}

/// Scramble a deterministic subset of characters while glitching
fn render(text: &str, glitching: bool) -> String {
    if !glitching {
        return format!("> {}", text);
    }
    let scrambled: String = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_alphanumeric() && (i * 7 + text.len()) % 5 == 0 {
                GLITCH_GLYPHS[i % GLITCH_GLYPHS.len()]
            } else {
                c
            }
        })
        .collect();
    format!("> {}", scrambled)
}

/// Rings the terminal bell for each pulse
pub struct BellFeedback<W: Write> {
    out: W,
    pulses: u64,
}

impl<W: Write> BellFeedback<W> {
    /// Create a new bell writing to `out`
    pub fn new(out: W) -> Self {
        Self { out, pulses: 0 }
    }
}

impl<W: Write> Feedback for BellFeedback<W> {
    fn pulse(&mut self) {
        self.pulses += 1;
        debug!(total = self.pulses, "pulse");
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            warn!(?e, "failed to ring bell");
        }
    }
}
