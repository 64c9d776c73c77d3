//! Debate topics.

use serde::{Deserialize, Serialize};

use crate::error::DebateError;

/// A subject for debate. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    pub title: String,
    /// The question fed into both personas.
    pub question: String,
    /// Decorative only.
    pub emoji: String,
}

impl Topic {
    pub fn new(
        title: impl Into<String>,
        question: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            question: question.into(),
            emoji: emoji.into(),
        }
    }

    /// A user-supplied question.
    pub fn custom(question: &str) -> Result<Self, DebateError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DebateError::InvalidTopic(
                "custom topic question cannot be empty".to_string(),
            ));
        }
        Ok(Self::new("Custom Topic", question, "💬"))
    }
}

/// The built-in topic catalogue.
pub fn preset_topics() -> Vec<Topic> {
    vec![
        Topic::new(
            "Artificial Intelligence",
            "Will AI do more good than harm for humanity?",
            "🤖",
        ),
        Topic::new(
            "Space Colonization",
            "Is colonizing other planets a necessary step for human survival?",
            "🚀",
        ),
        Topic::new(
            "Remote Work",
            "Should remote work be the default for all office-based jobs?",
            "💻",
        ),
        Topic::new(
            "Universal Basic Income",
            "Is Universal Basic Income a viable solution to poverty and unemployment?",
            "💰",
        ),
        Topic::new(
            "Social Media",
            "Does social media have a net positive or negative impact on society?",
            "📱",
        ),
        Topic::new(
            "Nuclear Energy",
            "Should we invest more heavily in nuclear energy to combat climate change?",
            "⚛️",
        ),
    ]
}

/// Resolve a topic argument: a 1-based preset index, a preset title
/// (case-insensitive), or otherwise a custom question.
pub fn resolve_topic(input: &str) -> Result<Topic, DebateError> {
    let presets = preset_topics();
    let trimmed = input.trim();

    if let Ok(index) = trimmed.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| presets.get(i).cloned())
            .ok_or_else(|| {
                DebateError::InvalidTopic(format!(
                    "no preset topic #{} (choose 1-{})",
                    index,
                    presets.len()
                ))
            });
    }

    if let Some(topic) = presets
        .iter()
        .find(|t| t.title.eq_ignore_ascii_case(trimmed))
    {
        return Ok(topic.clone());
    }

    Topic::custom(trimmed)
}
