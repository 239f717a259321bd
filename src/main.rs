//! force-touch-glitches: glitching text driven by a deep press
//!
//! Reads force samples (or `press` / `release` / `cancel` / `quit`) from
//! stdin and plays a timed narrative while the press is held:
//! - Entry hint when the view appears
//! - Three hold-then-fade stages, one at a time
//! - Completion pulses and a farewell if the press survives to the end
//!
//! Releasing at any point cancels whatever has not fired yet.

mod config;
mod events;
mod gesture;
mod lifecycle;
mod output;
mod sequence;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, EventLog};
use crate::events::SequenceEvent;
use crate::gesture::{GestureListener, PressureTracker};
use crate::lifecycle::ShutdownSignal;
use crate::output::{BellFeedback, ConsolePresenter};
use crate::sequence::{Sequencer, TokioScheduler};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout is the label
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "force-touch-glitches starting"
    );

    let config = Config::load()?;
    info!(?config, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    // Gesture listener -> sequencer
    let (gesture_tx, gesture_rx) = mpsc::channel(32);
    // Sequencer -> event echo
    let (event_tx, mut event_rx) = broadcast::channel::<SequenceEvent>(64);

    let (scheduler, wake_rx) = TokioScheduler::new();
    let mut sequencer = Sequencer::new(
        &config,
        ConsolePresenter::new(std::io::stdout()),
        BellFeedback::new(std::io::stdout()),
        scheduler,
        event_tx,
    );

    let listener = GestureListener::new(gesture_tx, PressureTracker::from_config(&config));
    if let Err(e) = listener.start() {
        error!(%e, "failed to start gesture listener");
        return Err(e.into());
    }

    sequencer.on_appear();

    info!("initialized, entering main loop");

    tokio::select! {
        _ = sequencer.run(gesture_rx, wake_rx) => {
            info!("gesture input finished");
        }

        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        info!(%event, "sequence event");
                        if config.event_log == EventLog::Json {
                            match serde_json::to_string(&event) {
                                Ok(line) => println!("{}", line),
                                Err(e) => warn!(?e, "failed to encode event"),
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("event echo exited");
        }

        result = shutdown.wait() => {
            match result {
                Ok(signal) => info!(?signal, "shutdown signal received"),
                Err(e) => error!(?e, "failed to install signal handlers"),
            }
        }
    }

    info!("shutting down...");
    listener.stop();

    info!(
        state = %sequencer.state(),
        generation = sequencer.generation(),
        listener_running = listener.is_running(),
        "force-touch-glitches stopped"
    );

    Ok(())
}
