//! Grading for interactive exercise cards.
//!
//! Fill-blank, dropdown and matching exercises are graded in the browser.
//! The grading logic is plain Rust and compiles on every target; the `dom`
//! module binding it to page markup is only built for `wasm32`.

pub mod answer;
pub mod error;
pub mod exercise;
pub mod fields;
pub mod matching;
pub mod score;

#[cfg(target_arch = "wasm32")]
mod dom;

pub use answer::{alternatives, first_alternative, is_correct};
pub use error::GraderError;
pub use exercise::{Exercise, ExerciseBody, ExerciseKind, ExerciseSummary};
pub use fields::{BlankFocus, Field, FieldGrade, FieldSet};
pub use matching::{
    ClickOutcome, ItemId, ItemState, MatchBoard, MatchItem, MatchRecord, PendingClear, Selection,
    MISMATCH_CLEAR_DELAY_MS,
};
pub use score::{present, ScoreBand, ScoreDisplay, ScoreReport};
