//! Debating styles and persona construction.
//!
//! A persona is the system instruction that fixes a debater's identity,
//! stance and style for the lifetime of its session. Each [`Style`] maps to
//! its own builder through an exhaustive match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DebateError;
use crate::participant::{Debater, Debaters, Stance};

/// Debating style applied to one side's persona.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Analytical,
    Passionate,
    Witty,
    Philosophical,
}

impl Style {
    pub const ALL: [Style; 4] = [
        Style::Analytical,
        Style::Passionate,
        Style::Witty,
        Style::Philosophical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Style::Analytical => "analytical",
            Style::Passionate => "passionate",
            Style::Witty => "witty",
            Style::Philosophical => "philosophical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Style::Analytical => "Logical, evidence-driven and precise",
            Style::Passionate => "Emotive, urgent and rousing",
            Style::Witty => "Sharp, playful and quick with a comeback",
            Style::Philosophical => "Reflective, principled and probing",
        }
    }

    /// Build the persona instruction for `debater` facing `opponent`.
    pub fn persona(&self, debater: &Debater, opponent: &Debater, question: &str) -> String {
        let ctx = PersonaContext {
            name: &debater.name,
            opponent: &opponent.name,
            stance: debater.stance(),
            question,
        };
        match self {
            Style::Analytical => analytical_persona(&ctx),
            Style::Passionate => passionate_persona(&ctx),
            Style::Witty => witty_persona(&ctx),
            Style::Philosophical => philosophical_persona(&ctx),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = DebateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Style::ALL
            .into_iter()
            .find(|style| style.name() == wanted)
            .ok_or_else(|| {
                DebateError::UnknownStyle(format!(
                    "'{}'. Available styles: {}",
                    s,
                    Style::ALL.map(|style| style.name()).join(", ")
                ))
            })
    }
}

/// Style chosen for each side of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DebateStyles {
    pub a: Style,
    pub b: Style,
}

impl DebateStyles {
    pub fn new(a: Style, b: Style) -> Self {
        Self { a, b }
    }

    /// Personas for both debaters, A first.
    pub fn personas(&self, debaters: &Debaters, question: &str) -> (String, String) {
        (
            self.a.persona(&debaters.a, &debaters.b, question),
            self.b.persona(&debaters.b, &debaters.a, question),
        )
    }
}

struct PersonaContext<'a> {
    name: &'a str,
    opponent: &'a str,
    stance: Stance,
    question: &'a str,
}

impl PersonaContext<'_> {
    fn stance_goal(&self) -> &'static str {
        match self.stance {
            Stance::InFavor => "present strong, well-reasoned arguments to support this position",
            Stance::Against => "present strong, well-reasoned arguments to counter the opposing view",
        }
    }

    /// Lines shared by every style.
    fn preamble(&self, epithet: &str) -> String {
        format!(
            "You are {epithet} debater named '{name}'.\n\
             Your stance on the topic '{question}' is firmly **{stance}**.\n\
             Your goal is to {goal}.",
            epithet = epithet,
            name = self.name,
            question = self.question,
            stance = self.stance.display_name(),
            goal = self.stance_goal(),
        )
    }

    fn rules(&self) -> String {
        format!(
            "Keep your responses concise and impactful, ideally under 80 words.\n\
             Address your opponent, '{}', directly.\n\
             Do not agree with your opponent. Your purpose is to win the debate.",
            self.opponent
        )
    }
}

fn analytical_persona(ctx: &PersonaContext<'_>) -> String {
    let manner = match ctx.stance {
        Stance::InFavor => "Be persuasive, logical, and assertive.",
        Stance::Against => "Be critical, analytical, and challenge your opponent's points.",
    };
    format!(
        "{}\n{} Ground every claim in evidence, data or a clear chain of reasoning, \
         and point out gaps in your opponent's logic.\n{}",
        ctx.preamble("an expert"),
        manner,
        ctx.rules()
    )
}

fn passionate_persona(ctx: &PersonaContext<'_>) -> String {
    format!(
        "{}\nSpeak with conviction and urgency. Appeal to values, human stories and \
         the stakes involved, and make the audience feel why this matters.\n{}",
        ctx.preamble("a fiery, passionate"),
        ctx.rules()
    )
}

fn witty_persona(ctx: &PersonaContext<'_>) -> String {
    format!(
        "{}\nUse sharp wit, clever analogies and the occasional well-aimed jab. \
         Turn your opponent's points against them, but never lose the substance of the argument.\n{}",
        ctx.preamble("a quick-witted"),
        ctx.rules()
    )
}

fn philosophical_persona(ctx: &PersonaContext<'_>) -> String {
    format!(
        "{}\nReason from first principles. Question hidden assumptions, draw on ethical \
         frameworks and thinkers where relevant, and expose the deeper implications of each position.\n{}",
        ctx.preamble("a thoughtful, philosophical"),
        ctx.rules()
    )
}
