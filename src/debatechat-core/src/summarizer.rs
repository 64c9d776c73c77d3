//! Impartial two-sided debate summaries.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::DebateError;
use crate::session::LanguageModel;
use crate::transcript::DebateSummary;

/// Shown for both sides when a summary cannot be produced.
pub const SUMMARY_FALLBACK: &str = "Could not generate summary.";

const SCHEMA_NAME: &str = "debate_summary";

/// One-shot summarizer backed by structured generation.
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Summarize each participant's arguments from `transcript_text`.
    ///
    /// Fails with [`DebateError::MalformedResponse`] when the payload does
    /// not carry a string for both participants.
    pub async fn summarize(
        &self,
        transcript_text: &str,
        name_a: &str,
        name_b: &str,
    ) -> Result<DebateSummary, DebateError> {
        let prompt = summary_prompt(transcript_text, name_a, name_b);
        let schema = summary_schema(name_a, name_b);

        debug!(lines = transcript_text.lines().count(), "requesting debate summary");
        let payload = self
            .model
            .generate_structured(&prompt, SCHEMA_NAME, &schema)
            .await?;

        parse_summary(&payload, name_a, name_b)
    }
}

fn summary_prompt(transcript_text: &str, name_a: &str, name_b: &str) -> String {
    format!(
        r#"You are a neutral debate analyst. Read the following debate between {a} and {b}.

Summarize the key arguments made by each participant in two or three sentences.
Be strictly impartial: describe what each side argued, do not evaluate who argued better,
and never declare a winner.

Return a JSON object with exactly two fields: "{a}" containing the summary of {a}'s arguments
and "{b}" containing the summary of {b}'s arguments.

DEBATE TRANSCRIPT:
{transcript}"#,
        a = name_a,
        b = name_b,
        transcript = transcript_text
    )
}

/// JSON schema with one required string field per participant.
pub fn summary_schema(name_a: &str, name_b: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            name_a: {
                "type": "string",
                "description": format!("Summary of {}'s arguments.", name_a),
            },
            name_b: {
                "type": "string",
                "description": format!("Summary of {}'s arguments.", name_b),
            },
        },
        "required": [name_a, name_b],
        "additionalProperties": false,
    })
}

fn parse_summary(payload: &Value, name_a: &str, name_b: &str) -> Result<DebateSummary, DebateError> {
    let object = payload.as_object().ok_or_else(|| {
        DebateError::MalformedResponse(format!("expected a JSON object, got: {}", payload))
    })?;

    let field = |name: &str| -> Result<String, DebateError> {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DebateError::MalformedResponse(format!("missing summary for '{}'", name))
            })
    };

    Ok(DebateSummary {
        a: field(name_a)?,
        b: field(name_b)?,
    })
}
