//! Debater identities.
//!
//! A debate always has exactly two sides: `A` argues in favor of the
//! question and `B` argues against it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DebateError;

/// Identity of one of the two debaters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DebaterId {
    A,
    B,
}

impl DebaterId {
    /// The other debater.
    pub fn opponent(self) -> Self {
        match self {
            DebaterId::A => DebaterId::B,
            DebaterId::B => DebaterId::A,
        }
    }

    /// The fixed stance argued by this debater.
    pub fn stance(self) -> Stance {
        match self {
            DebaterId::A => Stance::InFavor,
            DebaterId::B => Stance::Against,
        }
    }
}

impl fmt::Display for DebaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebaterId::A => write!(f, "A"),
            DebaterId::B => write!(f, "B"),
        }
    }
}

/// Side argued by a debater for the whole run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Stance {
    /// Arguing in favor of the question.
    InFavor,
    /// Arguing against the question.
    Against,
}

impl Stance {
    pub fn display_name(&self) -> &str {
        match self {
            Stance::InFavor => "in favor",
            Stance::Against => "against",
        }
    }
}

/// A named debater.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Debater {
    pub id: DebaterId,
    /// Display name, also used to address the opponent in personas.
    pub name: String,
}

impl Debater {
    pub fn new(id: DebaterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn stance(&self) -> Stance {
        self.id.stance()
    }

    /// Get the full display name with stance.
    pub fn display_name_with_stance(&self) -> String {
        format!("{} ({})", self.name, self.stance().display_name().to_uppercase())
    }
}

/// The two debaters of a run, indexable by [`DebaterId`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Debaters {
    pub a: Debater,
    pub b: Debater,
}

impl Debaters {
    pub fn new(name_a: impl Into<String>, name_b: impl Into<String>) -> Self {
        Self {
            a: Debater::new(DebaterId::A, name_a),
            b: Debater::new(DebaterId::B, name_b),
        }
    }

    pub fn get(&self, id: DebaterId) -> &Debater {
        match id {
            DebaterId::A => &self.a,
            DebaterId::B => &self.b,
        }
    }

    /// Names key the two summary fields, so both must be present and
    /// distinct.
    pub fn validate(&self) -> Result<(), DebateError> {
        let (a, b) = (self.a.name.trim(), self.b.name.trim());
        if a.is_empty() || b.is_empty() {
            return Err(DebateError::ConfigError(
                "debater names cannot be empty".to_string(),
            ));
        }
        if a == b {
            return Err(DebateError::ConfigError(format!(
                "debater names must differ (both are '{}')",
                a
            )));
        }
        Ok(())
    }
}

impl Default for Debaters {
    fn default() -> Self {
        Self::new("Logos", "Pathos")
    }
}
