//! Sequence module: the press-driven message narrative
//!
//! - Idle: nothing pressed yet
//! - Messaging: a press is live, stages or completion script running
//! - Cancelled: the last press ended early
//! - Completed: the last press reached the farewell

mod machine;
mod scheduler;
mod script;
#[cfg(test)]
mod testing;

pub use machine::Sequencer;
pub use scheduler::TokioScheduler;
