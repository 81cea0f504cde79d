//! Lesson content for the workbook.
//!
//! Lessons live as JSON files in the lessons directory (see `paths.rs`).
//! They are loaded once at startup, validated with the grader's answer-key
//! rules, and rendered into exercise cards by the handlers.

pub mod lessons;

pub use lessons::{
    load_lessons, split_sentence, validate_exercise, BlankDef, ExerciseDef, Lesson,
    LessonLibrary, LessonLoadError, PairDef, Segment, SentenceDef,
};
