//! Exercise kinds and the operations the page invokes on an exercise.

use serde::{Deserialize, Serialize};

use crate::error::GraderError;
use crate::fields::FieldSet;
use crate::matching::MatchBoard;
use crate::score::ScoreDisplay;

/// Type of exercise, carried on the container as `data-kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    /// Free-text blanks, optionally with a word bank
    FillBlank,
    /// One select control per blank
    Dropdown,
    /// Click prompt, then target
    Matching,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FillBlank => "fill-blank",
            Self::Dropdown => "dropdown",
            Self::Matching => "matching",
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExerciseKind {
    type Err = GraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fill-blank" => Ok(Self::FillBlank),
            "dropdown" => Ok(Self::Dropdown),
            "matching" => Ok(Self::Matching),
            other => Err(GraderError::UnknownKind(other.to_string())),
        }
    }
}

/// Kind-specific state of an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseBody {
    FillBlank(FieldSet),
    Dropdown(FieldSet),
    Matching(MatchBoard),
}

impl ExerciseBody {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            Self::FillBlank(_) => ExerciseKind::FillBlank,
            Self::Dropdown(_) => ExerciseKind::Dropdown,
            Self::Matching(_) => ExerciseKind::Matching,
        }
    }
}

/// One exercise on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub body: ExerciseBody,
    score: ScoreDisplay,
    visible: bool,
}

/// Snapshot returned to the page after an operation.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSummary<'a> {
    pub id: &'a str,
    pub kind: ExerciseKind,
    pub visible: bool,
    pub score: &'a ScoreDisplay,
}

impl Exercise {
    pub fn new(id: impl Into<String>, body: ExerciseBody) -> Self {
        Self {
            id: id.into(),
            body,
            score: ScoreDisplay::Hidden,
            visible: true,
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        self.body.kind()
    }

    pub fn score(&self) -> &ScoreDisplay {
        &self.score
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Grade the exercise and show its score.
    pub fn check(&mut self) -> &ScoreDisplay {
        let report = match &mut self.body {
            ExerciseBody::FillBlank(fields) | ExerciseBody::Dropdown(fields) => fields.grade(),
            ExerciseBody::Matching(board) => board.score(),
        };
        tracing::info!(exercise = %self.id, percentage = report.percentage, "checked");
        self.score = ScoreDisplay::Score(report);
        &self.score
    }

    /// Fill in every answer.
    pub fn reveal(&mut self) -> &ScoreDisplay {
        match &mut self.body {
            ExerciseBody::FillBlank(fields) | ExerciseBody::Dropdown(fields) => fields.reveal(),
            ExerciseBody::Matching(board) => board.reveal(),
        }
        self.score = ScoreDisplay::Revealed;
        &self.score
    }

    /// Clear all input and hide the score.
    pub fn reset(&mut self) -> &ScoreDisplay {
        match &mut self.body {
            ExerciseBody::FillBlank(fields) | ExerciseBody::Dropdown(fields) => fields.reset(),
            ExerciseBody::Matching(board) => board.reset(),
        }
        self.score = ScoreDisplay::Hidden;
        &self.score
    }

    /// Show or hide the exercise body. Returns the new visibility.
    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn summary(&self) -> ExerciseSummary<'_> {
        ExerciseSummary {
            id: &self.id,
            kind: self.kind(),
            visible: self.visible,
            score: &self.score,
        }
    }
}
