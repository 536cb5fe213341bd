//! Events reported by an installer build.
//!
//! A run emits any number of [`BuildEvent::Progress`] and [`BuildEvent::Log`]
//! events followed by exactly one [`BuildEvent::Finished`], which is always
//! the last event of the run.

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Event crossing from the build worker back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BuildEvent {
    /// Checkpoint with a percentage in `0..=100`.
    Progress { percent: u8, message: String },
    /// Free-text narration line.
    Log { message: String },
    /// Terminal outcome of the run.
    Finished { success: bool, message: String },
}

impl BuildEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Sender half of a build event channel.
pub type EventSender = UnboundedSender<BuildEvent>;

/// Receiver half of a build event channel.
pub type EventReceiver = UnboundedReceiver<BuildEvent>;

/// Create a new build event channel.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Phases of the build state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    Idle,
    Preparing,
    Scripting,
    Specifying,
    Packaging,
    Collecting,
    Relocating,
    Signing,
    Done,
    Failed,
}

impl BuildPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Scripting => "scripting",
            Self::Specifying => "specifying",
            Self::Packaging => "packaging",
            Self::Collecting => "collecting",
            Self::Relocating => "relocating",
            Self::Signing => "signing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emits build events for a single run.
///
/// Send failures are ignored: a caller that dropped its receiver simply stops
/// observing the run. Log lines are mirrored to the `log` facade.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: EventSender,
}

impl EventSink {
    pub fn new(sender: EventSender) -> Self {
        Self { sender }
    }

    pub fn progress(&self, percent: u8, message: impl Into<String>) {
        let message = message.into();
        log::debug!("[{:>3}%] {}", percent.min(100), message);
        let _ = self.sender.send(BuildEvent::Progress {
            percent: percent.min(100),
            message,
        });
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        let _ = self.sender.send(BuildEvent::Log { message });
    }

    pub(crate) fn finished(&self, success: bool, message: impl Into<String>) {
        let _ = self.sender.send(BuildEvent::Finished {
            success,
            message: message.into(),
        });
    }
}
