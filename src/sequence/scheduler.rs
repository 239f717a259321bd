//! Deferred continuations
//!
//! Every wait in the sequence is a [`Continuation`] handed to a
//! [`Scheduler`], which gives it back to the sequencer once it is due.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

/// What a continuation does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Entry hint reached full opacity
    HintFadedIn,
    /// Entry hint finished fading out
    HintFadedOut,
    /// Stage reached full opacity
    StageFadedIn(usize),
    /// Stage finished fading out
    StageFadedOut(usize),
    /// Nth delayed completion pulse
    CompletionPulse(u32),
    /// Hide everything and show the farewell
    Reveal,
}

/// A step tagged with the generation that scheduled it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    pub generation: u64,
    pub step: Step,
}

/// Runs a continuation once, later, without blocking the caller
pub trait Scheduler {
    fn after(&mut self, delay: Duration, continuation: Continuation);
}

/// Scheduler backed by tokio timers
///
/// Due continuations are delivered through a channel so that they are
/// handled on the same loop as gesture events.
#[derive(Clone)]
pub struct TokioScheduler {
    wake_tx: mpsc::UnboundedSender<Continuation>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its continuations arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Continuation>) {
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        (Self { wake_tx }, wake_rx)
    }
}

impl Scheduler for TokioScheduler {
    fn after(&mut self, delay: Duration, continuation: Continuation) {
        trace!(?continuation, delay_ms = delay.as_millis() as u64, "scheduled");
        let wake_tx = self.wake_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the main loop already exited
            let _ = wake_tx.send(continuation);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn continuation(step: Step) -> Continuation {
        Continuation { generation: 1, step }
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuations_arrive_in_due_order() {
        let (mut scheduler, mut wake_rx) = TokioScheduler::new();
        let start = Instant::now();

        scheduler.after(Duration::from_secs(2), continuation(Step::Reveal));
        scheduler.after(Duration::from_secs(1), continuation(Step::CompletionPulse(1)));

        let first = wake_rx.recv().await.unwrap();
        assert_eq!(first.step, Step::CompletionPulse(1));
        assert!(start.elapsed() >= Duration::from_secs(1));

        let second = wake_rx.recv().await.unwrap();
        assert_eq!(second.step, Step::Reveal);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_arrives_early() {
        let (mut scheduler, mut wake_rx) = TokioScheduler::new();
        scheduler.after(Duration::from_secs(5), continuation(Step::HintFadedOut));

        tokio::time::sleep(Duration::from_secs(4)).await;
        let mut recv = tokio_test::task::spawn(wake_rx.recv());
        tokio_test::assert_pending!(recv.poll());
        drop(recv);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(
            wake_rx.recv().await.unwrap().step,
            Step::HintFadedOut
        );
    }
}
