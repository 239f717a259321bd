//! Configuration loading and management

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

/// Number of messages in the press narrative
pub const STAGE_COUNT: usize = 3;

/// How sequence events are echoed by the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventLog {
    /// Events only appear in tracing output
    #[default]
    Off,
    /// Each event is printed to stdout as one JSON line
    Json,
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Duration of every fade in or fade out
    pub fade: Duration,

    /// Lead-in and hold delay of the entry hint
    pub hint_delay: Duration,

    /// Spacing between completion pulses and the farewell reveal
    pub pulse_interval: Duration,

    /// Time each stage stays at full opacity, in stage order
    pub stage_holds: [Duration; STAGE_COUNT],

    /// Force at or above which a press begins
    pub press_threshold: f32,

    /// Force below which a live press ends
    pub release_threshold: f32,

    /// Event echo mode
    pub event_log: EventLog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(1000),
            hint_delay: Duration::from_millis(2000),
            pulse_interval: Duration::from_millis(1000),
            stage_holds: [
                Duration::from_millis(2000),
                Duration::from_millis(2000),
                Duration::from_millis(3000),
            ],
            press_threshold: 0.75,
            release_threshold: 0.5,
            event_log: EventLog::Off,
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("GLITCH_FADE_MS") {
            config.fade = parse_millis("GLITCH_FADE_MS", &raw)?;
        }
        if let Some(raw) = lookup("GLITCH_HINT_DELAY_MS") {
            config.hint_delay = parse_millis("GLITCH_HINT_DELAY_MS", &raw)?;
        }
        if let Some(raw) = lookup("GLITCH_PULSE_INTERVAL_MS") {
            config.pulse_interval = parse_millis("GLITCH_PULSE_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("GLITCH_STAGE_HOLDS_MS") {
            config.stage_holds = parse_holds("GLITCH_STAGE_HOLDS_MS", &raw)?;
        }
        if let Some(raw) = lookup("GLITCH_PRESS_THRESHOLD") {
            config.press_threshold = parse_force("GLITCH_PRESS_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("GLITCH_RELEASE_THRESHOLD") {
            config.release_threshold = parse_force("GLITCH_RELEASE_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("GLITCH_EVENT_LOG") {
            config.event_log = match raw.trim() {
                "" | "off" => EventLog::Off,
                "json" => EventLog::Json,
                other => bail!("GLITCH_EVENT_LOG must be `off` or `json`, got `{other}`"),
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject threshold pairs that would leave no hysteresis band
    pub fn validate(&self) -> Result<()> {
        if self.release_threshold >= self.press_threshold {
            bail!(
                "release threshold {} must be below press threshold {}",
                self.release_threshold,
                self.press_threshold
            );
        }
        Ok(())
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    let millis: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of milliseconds"))?;
    Ok(Duration::from_millis(millis))
}

/// Comma-separated milliseconds, one per stage
fn parse_holds(key: &str, raw: &str) -> Result<[Duration; STAGE_COUNT]> {
    let holds = raw
        .split(',')
        .map(|part| parse_millis(key, part))
        .collect::<Result<Vec<_>>>()?;
    let count = holds.len();
    holds
        .try_into()
        .map_err(|_| anyhow!("{key} needs {STAGE_COUNT} comma-separated values, got {count}"))
}

fn parse_force(key: &str, raw: &str) -> Result<f32> {
    let force: f32 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number"))?;
    if !(0.0..=1.0).contains(&force) {
        bail!("{key} must be within 0.0..=1.0, got {force}");
    }
    Ok(force)
}
