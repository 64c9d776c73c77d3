//! Transcript and observable run state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::participant::{DebaterId, Debaters};
use crate::persona::DebateStyles;
use crate::topic::Topic;

/// One committed debate message. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub debater_id: DebaterId,
}

impl Message {
    pub fn new(debater_id: DebaterId, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            debater_id,
        }
    }
}

/// Render messages as summarizer input: one `"{name}: {text}"` line per
/// message, in order.
pub fn transcript_text(messages: &[Message], debaters: &Debaters) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", debaters.get(m.debater_id).name, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Neutral synopsis of each side's arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebateSummary {
    pub a: String,
    pub b: String,
}

impl DebateSummary {
    pub fn get(&self, id: DebaterId) -> &str {
        match id {
            DebaterId::A => &self.a,
            DebaterId::B => &self.b,
        }
    }
}

/// Scheduler phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DebatePhase {
    #[default]
    Idle,
    Running,
    Summarizing,
    Ended,
}

/// Why a running debate stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    User,
    Timeout,
    Error,
}

impl StopReason {
    pub fn display_name(&self) -> &str {
        match self {
            StopReason::User => "stopped",
            StopReason::Timeout => "time is up",
            StopReason::Error => "error",
        }
    }
}

/// Externally observable state of the current run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DebateRunState {
    /// Incremented for every start or reset. Effects from older runs are
    /// discarded.
    pub generation: u64,
    pub phase: DebatePhase,
    pub is_debating: bool,
    pub is_thinking: Option<DebaterId>,
    pub has_started: bool,
    pub time_left: u64,
    pub messages: Vec<Message>,
    pub summary: Option<DebateSummary>,
    pub is_summarizing: bool,
    pub stop_reason: Option<StopReason>,
    pub topic: Option<Topic>,
    pub styles: Option<DebateStyles>,
}

impl DebateRunState {
    pub fn is_running(&self) -> bool {
        self.phase == DebatePhase::Running
    }
}
