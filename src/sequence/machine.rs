//! Core sequencer implementation
//!
//! Turns press start/end edges into a cancellable, timed run of stage
//! messages and feedback pulses. Every wait is a scheduled continuation
//! carrying the generation that created it; a continuation whose
//! generation is no longer live is dropped without side effects.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::config::Config;
use crate::events::SequenceEvent;
use crate::gesture::GestureEvent;
use crate::output::{Feedback, Presenter};

use super::scheduler::{Continuation, Scheduler, Step};
use super::script::{self, Stage, COMPLETION_PULSES, HINT_TEXT};

/// Where the sequencer is in its narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceState {
    /// Nothing has been pressed yet
    #[default]
    Idle,
    /// A press is live and stages or the completion script are running
    Messaging,
    /// The last press ended before the farewell
    Cancelled,
    /// The last press reached the farewell
    Completed,
}

impl std::fmt::Display for SequenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceState::Idle => write!(f, "Idle"),
            SequenceState::Messaging => write!(f, "Messaging"),
            SequenceState::Cancelled => write!(f, "Cancelled"),
            SequenceState::Completed => write!(f, "Completed"),
        }
    }
}

/// The live press
#[derive(Debug)]
struct PressSession {
    generation: u64,
    /// Stage currently on screen
    stage: Option<usize>,
    pulses: u32,
    started_at: Instant,
}

/// Fade and interval timing
#[derive(Debug, Clone, Copy)]
struct Timing {
    fade: Duration,
    hint_delay: Duration,
    pulse_interval: Duration,
}

/// The gesture-driven message sequencer
pub struct Sequencer<P, F, S> {
    state: SequenceState,
    /// Bumped on every press start
    generation: u64,
    session: Option<PressSession>,
    stages: Vec<Stage>,
    timing: Timing,
    presenter: P,
    feedback: F,
    scheduler: S,
    rng: StdRng,
    event_tx: broadcast::Sender<SequenceEvent>,
}

impl<P, F, S> Sequencer<P, F, S>
where
    P: Presenter,
    F: Feedback,
    S: Scheduler,
{
    /// Create a new sequencer
    pub fn new(
        config: &Config,
        presenter: P,
        feedback: F,
        scheduler: S,
        event_tx: broadcast::Sender<SequenceEvent>,
    ) -> Self {
        Self {
            state: SequenceState::Idle,
            generation: 0,
            session: None,
            stages: script::stages(&config.stage_holds),
            timing: Timing {
                fade: config.fade,
                hint_delay: config.hint_delay,
                pulse_interval: config.pulse_interval,
            },
            presenter,
            feedback,
            scheduler,
            rng: StdRng::from_entropy(),
            event_tx,
        }
    }

    /// Replace the farewell name generator
    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Get the current state
    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Get the generation of the most recent press
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if a press session is live
    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }

    /// Run the sequencer, processing gestures and due continuations
    ///
    /// Returns when the gesture source quits or closes.
    pub async fn run(
        &mut self,
        mut gesture_rx: mpsc::Receiver<GestureEvent>,
        mut wake_rx: mpsc::UnboundedReceiver<Continuation>,
    ) {
        info!("sequencer started");

        loop {
            tokio::select! {
                gesture = gesture_rx.recv() => match gesture {
                    Some(GestureEvent::Quit) | None => break,
                    Some(event) => self.handle_gesture(event),
                },
                Some(continuation) = wake_rx.recv() => self.fire(continuation),
            }
        }

        info!(state = %self.state, "sequencer stopped");
    }

    /// Map a recognizer edge onto the press entry points
    pub fn handle_gesture(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Began => self.on_press_start(),
            GestureEvent::Ended | GestureEvent::Cancelled => self.on_press_end(),
            GestureEvent::Quit => {}
        }
    }

    /// Show the entry hint: fade in after a delay, hold, fade out
    pub fn on_appear(&mut self) {
        if self.is_live() {
            debug!("press already live, skipping entry hint");
            return;
        }

        self.presenter.show(HINT_TEXT);
        self.presenter
            .fade_to(1.0, self.timing.fade, self.timing.hint_delay);
        self.emit(SequenceEvent::HintShown);
        self.schedule(
            self.timing.hint_delay + self.timing.fade,
            Step::HintFadedIn,
        );
    }

    /// A deep press began
    pub fn on_press_start(&mut self) {
        if let Some(session) = &self.session {
            debug!(generation = session.generation, "press already live, ignoring start");
            return;
        }

        self.generation += 1;
        self.session = Some(PressSession {
            generation: self.generation,
            stage: None,
            pulses: 0,
            started_at: Instant::now(),
        });
        self.state = SequenceState::Messaging;

        info!(generation = self.generation, "press started");
        self.emit(SequenceEvent::PressStarted {
            generation: self.generation,
        });

        self.pulse();
        self.presenter.set_glitch_mode(true);
        self.present_stage(0);
    }

    /// The press was released or cancelled
    pub fn on_press_end(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("no live press, ignoring end");
            return;
        };
        self.state = SequenceState::Cancelled;

        info!(
            generation = session.generation,
            stage = ?session.stage,
            held_ms = session.started_at.elapsed().as_millis() as u64,
            "press ended"
        );

        self.presenter.fade_out_and_clear(self.timing.fade);
        self.presenter.set_glitch_mode(false);

        self.emit(SequenceEvent::PressEnded {
            generation: session.generation,
            stage: session.stage,
        });
    }

    /// Drive one due continuation
    pub fn fire(&mut self, continuation: Continuation) {
        if !self.is_current(&continuation) {
            debug!(
                ?continuation,
                live = self.generation,
                "dropping stale continuation"
            );
            return;
        }

        match continuation.step {
            Step::HintFadedIn => {
                self.presenter
                    .fade_to(0.0, self.timing.fade, self.timing.hint_delay);
                self.schedule(
                    self.timing.hint_delay + self.timing.fade,
                    Step::HintFadedOut,
                );
            }
            Step::HintFadedOut => {
                debug!("entry hint finished");
            }
            Step::StageFadedIn(index) => {
                let hold = self.stages[index].hold;
                self.presenter.fade_to(0.0, self.timing.fade, hold);
                self.schedule(hold + self.timing.fade, Step::StageFadedOut(index));
            }
            Step::StageFadedOut(index) => {
                if let Some(session) = self.session.as_mut() {
                    session.stage = None;
                }
                if index + 1 < self.stages.len() {
                    self.present_stage(index + 1);
                } else {
                    self.run_completion();
                }
            }
            Step::CompletionPulse(n) => {
                debug!(n, "completion pulse");
                self.pulse();
            }
            Step::Reveal => self.reveal(),
        }
    }

    /// Hint steps need an untouched generation and no press; press steps
    /// need their own generation to still be live
    fn is_current(&self, continuation: &Continuation) -> bool {
        match continuation.step {
            Step::HintFadedIn | Step::HintFadedOut => {
                self.session.is_none() && continuation.generation == self.generation
            }
            _ => self
                .session
                .as_ref()
                .is_some_and(|s| s.generation == continuation.generation),
        }
    }

    /// Put a stage on screen and start its fade in
    fn present_stage(&mut self, index: usize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.stage = Some(index);
        let generation = session.generation;
        let text = self.stages[index].text;

        debug!(generation, index, text, "presenting stage");
        self.presenter.show(text);
        self.presenter
            .fade_to(1.0, self.timing.fade, Duration::ZERO);
        self.emit(SequenceEvent::StageShown {
            generation,
            index,
            text: text.to_string(),
        });
        self.schedule(self.timing.fade, Step::StageFadedIn(index));
    }

    /// Pulse now, pulse on the interval, then reveal the farewell
    fn run_completion(&mut self) {
        info!(generation = self.generation, "all stages shown");
        self.pulse();

        for n in 1..=COMPLETION_PULSES {
            self.schedule(self.timing.pulse_interval * n, Step::CompletionPulse(n));
        }
        self.schedule(
            self.timing.pulse_interval * (COMPLETION_PULSES + 1),
            Step::Reveal,
        );
    }

    fn reveal(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let text = script::farewell(&mut self.rng);

        self.presenter.set_glitch_mode(false);
        self.presenter.reveal_farewell(&text);
        self.state = SequenceState::Completed;

        info!(
            generation = session.generation,
            pulses = session.pulses,
            "sequence completed"
        );
        self.emit(SequenceEvent::FarewellRevealed {
            generation: session.generation,
            text,
        });
    }

    fn pulse(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.pulses += 1;
        let event = SequenceEvent::Pulse {
            generation: session.generation,
            count: session.pulses,
        };

        self.feedback.pulse();
        self.emit(event);
    }

    fn schedule(&mut self, delay: Duration, step: Step) {
        self.scheduler.after(
            delay,
            Continuation {
                generation: self.generation,
                step,
            },
        );
    }

    fn emit(&self, event: SequenceEvent) {
        debug!(%event, "emitting event");
        let _ = self.event_tx.send(event);
    }
}
