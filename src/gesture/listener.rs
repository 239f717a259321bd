//! Simulated force-touch gesture source
//!
//! Reads force samples and commands from stdin on a dedicated thread and
//! turns them into press begin/end/cancel events for the sequencer.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::pressure::{Edge, InputLine, PressureTracker};

/// Events sent from the gesture source to the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// A deep press was recognized
    Began,
    /// The press was released
    Ended,
    /// The recognizer cancelled the press
    Cancelled,
    /// Input asked the program to stop
    Quit,
}

/// Gesture source that reads pressure input from stdin
pub struct GestureListener {
    event_tx: mpsc::Sender<GestureEvent>,
    tracker: PressureTracker,
    running: Arc<AtomicBool>,
}

impl GestureListener {
    /// Create a new gesture listener
    pub fn new(event_tx: mpsc::Sender<GestureEvent>, tracker: PressureTracker) -> Self {
        Self {
            event_tx,
            tracker,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the gesture listener
    ///
    /// Spawns a dedicated thread that blocks on stdin. The thread exits on
    /// EOF, on a `quit` line, or on the first line read after `stop()`.
    pub fn start(&self) -> Result<(), GestureError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(GestureError::AlreadyRunning);
        }

        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);
        let tracker = self.tracker;

        thread::Builder::new()
            .name("gesture-listener".to_string())
            .spawn(move || {
                info!("gesture listener thread started");

                let stdin = std::io::stdin();
                read_gestures(stdin.lock(), tracker, &event_tx, &running);

                running.store(false, Ordering::SeqCst);
                info!("gesture listener thread stopped");
            })
            .map_err(|e| GestureError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Stop the gesture listener
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur in the gesture listener
#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    #[error("gesture listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

/// Read lines until EOF, quit, or stop, forwarding gesture edges
fn read_gestures<R: BufRead>(
    reader: R,
    mut tracker: PressureTracker,
    event_tx: &mpsc::Sender<GestureEvent>,
    running: &AtomicBool,
) {
    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            return;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?e, "failed to read gesture input");
                break;
            }
        };

        let input = match InputLine::parse(&line) {
            Ok(input) => input,
            Err(e) => {
                warn!(%e, "ignoring gesture input");
                continue;
            }
        };

        let event = match input {
            InputLine::Empty => None,
            InputLine::Force(force) => tracker.update(force).map(edge_event),
            InputLine::Press => tracker.set_pressed(true).map(edge_event),
            InputLine::Release => tracker.set_pressed(false).map(edge_event),
            InputLine::Cancel => tracker
                .set_pressed(false)
                .map(|_| GestureEvent::Cancelled),
            InputLine::Quit => {
                let _ = event_tx.blocking_send(GestureEvent::Quit);
                return;
            }
        };

        if let Some(event) = event {
            debug!(?event, "gesture recognized");
            if event_tx.blocking_send(event).is_err() {
                warn!("failed to send gesture event - channel closed?");
                return;
            }
        }
    }

    // Input ran dry with a finger still down
    if tracker.is_pressed() {
        let _ = event_tx.blocking_send(GestureEvent::Cancelled);
    }

    // EOF ends the source like an explicit quit
    debug!("gesture input exhausted");
    let _ = event_tx.blocking_send(GestureEvent::Quit);
}

fn edge_event(edge: Edge) -> GestureEvent {
    match edge {
        Edge::Rising => GestureEvent::Began,
        Edge::Falling => GestureEvent::Ended,
    }
}
