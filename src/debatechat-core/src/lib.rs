//! DebateChat Core Library
//!
//! Runs a timed, turn-based debate between two language-model agents and
//! summarizes each side's arguments when it ends.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod participant;
pub mod persona;
pub mod session;
pub mod summarizer;
pub mod topic;
pub mod transcript;

pub use config::{Config, DebateSettings, ProviderConfig, default_config};
pub use error::DebateError;
pub use orchestrator::{DebateOrchestrator, TURN_ERROR_MESSAGE, opening_prompt};
pub use participant::{Debater, DebaterId, Debaters, Stance};
pub use persona::{DebateStyles, Style};
pub use session::{ChatSession, LanguageModel, OpenAiModel};
pub use summarizer::{SUMMARY_FALLBACK, Summarizer};
pub use topic::{Topic, preset_topics, resolve_topic};
pub use transcript::{DebatePhase, DebateRunState, DebateSummary, Message, StopReason};
