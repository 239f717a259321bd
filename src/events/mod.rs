//! Events module for sequence progress
//!
//! Provides structured event types emitted by the sequencer as a press
//! session moves through its stages, pulses and farewell.

use serde::{Deserialize, Serialize};

/// Events emitted by the sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SequenceEvent {
    /// Entry hint started fading in
    HintShown,

    /// A press session went live
    PressStarted {
        /// Generation of the new session
        generation: u64,
    },

    /// A stage's text was put on screen
    StageShown {
        generation: u64,
        /// Zero-based stage index
        index: usize,
        text: String,
    },

    /// A feedback pulse fired
    Pulse {
        generation: u64,
        /// Pulses fired so far in this session, including this one
        count: u32,
    },

    /// The completion script revealed the terminal view
    FarewellRevealed { generation: u64, text: String },

    /// A live session was cancelled by a release
    PressEnded {
        generation: u64,
        /// Stage on screen when the press ended, if any
        stage: Option<usize>,
    },
}

impl std::fmt::Display for SequenceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceEvent::HintShown => write!(f, "HINT_SHOWN"),
            SequenceEvent::PressStarted { generation } => {
                write!(f, "PRESS_STARTED (#{})", generation)
            }
            SequenceEvent::StageShown { generation, index, text } => {
                write!(f, "STAGE_SHOWN (#{} stage {}: {:?})", generation, index, text)
            }
            SequenceEvent::Pulse { generation, count } => {
                write!(f, "PULSE (#{} x{})", generation, count)
            }
            SequenceEvent::FarewellRevealed { generation, text } => {
                write!(f, "FAREWELL_REVEALED (#{}: {:?})", generation, text)
            }
            SequenceEvent::PressEnded { generation, .. } => {
                write!(f, "PRESS_ENDED (#{})", generation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SequenceEvent::StageShown {
            generation: 3,
            index: 1,
            text: "almost there".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("stage_shown"));
        assert!(json.contains("almost there"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"press_ended","generation":2,"stage":null}"#;
        let event: SequenceEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            SequenceEvent::PressEnded {
                generation: 2,
                stage: None
            }
        );
    }

    #[test]
    fn test_event_display() {
        let event = SequenceEvent::Pulse { generation: 1, count: 4 };
        assert_eq!(event.to_string(), "PULSE (#1 x4)");
    }
}
