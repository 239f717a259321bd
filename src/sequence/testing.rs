//! Recording capabilities and a virtual clock for sequencer tests

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::output::{Feedback, Presenter};

use super::machine::Sequencer;
use super::scheduler::{Continuation, Scheduler};

/// One observable side effect
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Show(String),
    Fade {
        opacity: f32,
        duration: Duration,
        delay: Duration,
    },
    Glitch(bool),
    FadeOutAndClear(Duration),
    Farewell(String),
    Pulse,
}

/// Shared, timestamped log of side effects
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<(Duration, Call)>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed(&self) -> Vec<(Duration, Call)> {
        self.0.borrow().clone()
    }

    pub fn pulses(&self) -> usize {
        self.count(|c| matches!(c, Call::Pulse))
    }

    pub fn farewells(&self) -> usize {
        self.count(|c| matches!(c, Call::Farewell(_)))
    }

    /// Texts passed to `show`, blanks excluded
    pub fn shown(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Show(text) if !text.is_empty() => Some(text),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|(_, c)| pred(c)).count()
    }
}

/// Pending continuations ordered by due time, then by insertion
#[derive(Default)]
pub struct Timeline {
    now: Duration,
    seq: u64,
    pending: Vec<(Duration, u64, Continuation)>,
}

impl Timeline {
    fn pop_due(&mut self, until: Duration) -> Option<(Duration, Continuation)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (due, _, _))| *due <= until)
            .min_by_key(|(_, (due, seq, _))| (*due, *seq))
            .map(|(idx, _)| idx)?;
        let (due, _, continuation) = self.pending.remove(idx);
        Some((due, continuation))
    }
}

/// Shared virtual clock
#[derive(Clone, Default)]
pub struct Clock(Rc<RefCell<Timeline>>);

impl Clock {
    pub fn now(&self) -> Duration {
        self.0.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().pending.len()
    }

    /// Fire every continuation due within `by`, in order
    pub fn advance<P, F>(&self, sequencer: &mut Sequencer<P, F, VirtualScheduler>, by: Duration)
    where
        P: Presenter,
        F: Feedback,
    {
        let until = self.now() + by;
        loop {
            let next = self.0.borrow_mut().pop_due(until);
            let Some((due, continuation)) = next else {
                break;
            };
            self.0.borrow_mut().now = due;
            sequencer.fire(continuation);
        }
        self.0.borrow_mut().now = until;
    }
}

/// Scheduler that queues onto a [`Clock`]
pub struct VirtualScheduler(pub Clock);

impl Scheduler for VirtualScheduler {
    fn after(&mut self, delay: Duration, continuation: Continuation) {
        let mut timeline = (self.0).0.borrow_mut();
        let due = timeline.now + delay;
        let seq = timeline.seq;
        timeline.seq += 1;
        timeline.pending.push((due, seq, continuation));
    }
}

pub struct RecordingPresenter {
    log: CallLog,
    clock: Clock,
}

impl RecordingPresenter {
    pub fn new(log: CallLog, clock: Clock) -> Self {
        Self { log, clock }
    }

    fn record(&self, call: Call) {
        self.log.0.borrow_mut().push((self.clock.now(), call));
    }
}

impl Presenter for RecordingPresenter {
    fn show(&mut self, text: &str) {
        self.record(Call::Show(text.to_string()));
    }

    fn fade_to(&mut self, opacity: f32, duration: Duration, delay: Duration) {
        self.record(Call::Fade {
            opacity,
            duration,
            delay,
        });
    }

    fn set_glitch_mode(&mut self, enabled: bool) {
        self.record(Call::Glitch(enabled));
    }

    fn fade_out_and_clear(&mut self, duration: Duration) {
        self.record(Call::FadeOutAndClear(duration));
    }

    fn reveal_farewell(&mut self, text: &str) {
        self.record(Call::Farewell(text.to_string()));
    }
}

pub struct RecordingFeedback {
    log: CallLog,
    clock: Clock,
}

impl RecordingFeedback {
    pub fn new(log: CallLog, clock: Clock) -> Self {
        Self { log, clock }
    }
}

impl Feedback for RecordingFeedback {
    fn pulse(&mut self) {
        self.log.0.borrow_mut().push((self.clock.now(), Call::Pulse));
    }
}
