//! Lesson loading and exercise definitions.
//!
//! Lessons are JSON files named `lesson_01.json`, `lesson_02.json`, ... in
//! the lessons directory. Each holds a title and a list of exercises; the
//! server renders them into exercise cards that the grader runs in the
//! browser.

use exercise_grader::{first_alternative, is_correct, ExerciseKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Marker prefix for a numbered blank in a sentence (`___1`, `___2`, ...).
pub const BLANK_MARKER: &str = "___";

/// A blank position in a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlankDef {
    /// Position in the sentence (matches ___1, ___2, etc.)
    pub position: u8,
    /// Answer key, alternatives separated by `/`
    pub answer: String,
    /// Display length in characters (defaults to the first answer's length)
    #[serde(default)]
    pub length: Option<u32>,
    /// Choices for dropdown exercises
    #[serde(default)]
    pub options: Vec<String>,
}

impl BlankDef {
    pub fn display_length(&self) -> u32 {
        self.length
            .unwrap_or_else(|| first_alternative(&self.answer).chars().count() as u32)
    }
}

/// A sentence with numbered blanks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceDef {
    pub text: String,
    #[serde(default)]
    pub blanks: Vec<BlankDef>,
}

/// A prompt and the target text it pairs with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairDef {
    pub prompt: String,
    pub answer: String,
}

/// A single exercise definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDef {
    /// Unique exercise ID within the lesson (e.g., "past-simple-1")
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    /// Sentences (fill-blank and dropdown)
    #[serde(default)]
    pub sentences: Vec<SentenceDef>,
    /// Clickable words that fill the focused blank (fill-blank)
    #[serde(default)]
    pub word_bank: Vec<String>,
    /// Prompt/answer pairs (matching)
    #[serde(default)]
    pub pairs: Vec<PairDef>,
    /// Extra targets with no prompt (matching)
    #[serde(default)]
    pub distractors: Vec<String>,
}

/// A lesson's worth of exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson number (taken from the filename when absent)
    #[serde(default)]
    pub lesson: u8,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub exercises: Vec<ExerciseDef>,
}

/// All loaded lessons, sorted by number.
#[derive(Debug, Clone, Default)]
pub struct LessonLibrary {
    pub lessons: Vec<Lesson>,
}

impl LessonLibrary {
    pub fn get(&self, number: u8) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.lesson == number)
    }

    pub fn exercise_count(&self) -> usize {
        self.lessons.iter().map(|l| l.exercises.len()).sum()
    }
}

/// Error loading lessons.
#[derive(Debug)]
pub enum LessonLoadError {
    IoError(String),
    ParseError(String),
    InvalidLesson(String),
}

impl std::fmt::Display for LessonLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LessonLoadError::IoError(e) => write!(f, "IO error: {}", e),
            LessonLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
            LessonLoadError::InvalidLesson(e) => write!(f, "Invalid lesson: {}", e),
        }
    }
}

impl std::error::Error for LessonLoadError {}

/// Part of a sentence: literal text or a numbered blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Blank(u8),
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}

/// Split a sentence at its `___N` markers.
///
/// Underscores not followed by a number stay literal text.
pub fn split_sentence(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(BLANK_MARKER) {
        let after = &rest[start + BLANK_MARKER.len()..];
        let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();

        match after[..digits].parse::<u8>() {
            Ok(position) => {
                push_text(&mut segments, &rest[..start]);
                segments.push(Segment::Blank(position));
                rest = &after[digits..];
            }
            Err(_) => {
                push_text(&mut segments, &rest[..start + BLANK_MARKER.len()]);
                rest = after;
            }
        }
    }
    push_text(&mut segments, rest);

    segments
}

/// Load all lessons from a directory.
///
/// A missing directory yields an empty library. Files that fail to parse or
/// validate are skipped with a warning.
pub fn load_lessons(lessons_dir: &Path) -> Result<LessonLibrary, LessonLoadError> {
    if !lessons_dir.is_dir() {
        tracing::warn!("Lessons directory {} not found", lessons_dir.display());
        return Ok(LessonLibrary::default());
    }

    let entries =
        fs::read_dir(lessons_dir).map_err(|e| LessonLoadError::IoError(e.to_string()))?;

    let mut loaded: Vec<(PathBuf, Lesson)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();

        // Skip non-JSON files
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let filename = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let Some(num) = parse_lesson_number(filename) else {
            tracing::warn!("Skipping {}: no lesson number (0-255) in file name", path.display());
            continue;
        };

        match load_lesson_file(&path) {
            Ok(mut lesson) => {
                if lesson.lesson == 0 {
                    lesson.lesson = num;
                }
                loaded.push((path, lesson));
            }
            Err(e) => {
                tracing::warn!("Failed to load lesson from {}: {}", path.display(), e);
            }
        }
    }

    // read_dir order is unspecified; ties on the number go to the first path
    loaded.sort_by(|(a_path, a), (b_path, b)| a.lesson.cmp(&b.lesson).then_with(|| a_path.cmp(b_path)));

    let mut lessons: Vec<Lesson> = Vec::with_capacity(loaded.len());
    for (path, lesson) in loaded {
        if lessons.last().is_some_and(|kept| kept.lesson == lesson.lesson) {
            tracing::warn!(
                "Skipping {}: lesson {} is already defined",
                path.display(),
                lesson.lesson
            );
            continue;
        }
        lessons.push(lesson);
    }

    Ok(LessonLibrary { lessons })
}

/// Parse lesson number from filename (e.g., "lesson_01" -> Some(1))
fn parse_lesson_number(filename: &str) -> Option<u8> {
    if let Some(num_str) = filename.strip_prefix("lesson_") {
        return num_str.parse().ok();
    }
    if let Some(num_str) = filename.strip_prefix("lesson") {
        return num_str.parse().ok();
    }
    None
}

/// Load and validate a single lesson file.
fn load_lesson_file(path: &Path) -> Result<Lesson, LessonLoadError> {
    let content =
        fs::read_to_string(path).map_err(|e| LessonLoadError::IoError(e.to_string()))?;

    let lesson: Lesson = serde_json::from_str(&content)
        .map_err(|e| LessonLoadError::ParseError(format!("{}: {}", path.display(), e)))?;

    validate_lesson(&lesson)?;
    Ok(lesson)
}

/// Validate every exercise and check ids are unique.
fn validate_lesson(lesson: &Lesson) -> Result<(), LessonLoadError> {
    let mut seen = HashSet::new();
    for ex in &lesson.exercises {
        validate_exercise(ex)?;
        if !seen.insert(ex.id.as_str()) {
            return Err(LessonLoadError::InvalidLesson(format!(
                "Duplicate exercise id {}",
                ex.id
            )));
        }
    }
    Ok(())
}

/// Validate an exercise definition.
pub fn validate_exercise(ex: &ExerciseDef) -> Result<(), LessonLoadError> {
    let invalid = |msg: String| Err(LessonLoadError::InvalidLesson(msg));

    if ex.id.trim().is_empty() {
        return invalid("Exercise missing ID".to_string());
    }

    match ex.kind {
        ExerciseKind::FillBlank | ExerciseKind::Dropdown => {
            if ex.sentences.is_empty() {
                return invalid(format!("Exercise {} has no sentences", ex.id));
            }
            for sentence in &ex.sentences {
                validate_sentence(ex, sentence)?;
            }
        }
        ExerciseKind::Matching => {
            if ex.pairs.is_empty() {
                return invalid(format!("Matching exercise {} has no pairs", ex.id));
            }
            for pair in &ex.pairs {
                if pair.prompt.trim().is_empty() || pair.answer.trim().is_empty() {
                    return invalid(format!("Matching exercise {} has an empty pair", ex.id));
                }
            }
        }
    }

    Ok(())
}

fn validate_sentence(ex: &ExerciseDef, sentence: &SentenceDef) -> Result<(), LessonLoadError> {
    let invalid = |msg: String| Err(LessonLoadError::InvalidLesson(msg));

    let markers: Vec<u8> = split_sentence(&sentence.text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Blank(p) => Some(p),
            Segment::Text(_) => None,
        })
        .collect();

    if markers.is_empty() {
        return invalid(format!("Exercise {} has a sentence without blanks", ex.id));
    }
    for position in &markers {
        if !sentence.blanks.iter().any(|b| b.position == *position) {
            return invalid(format!("Exercise {} has no answer for blank {}", ex.id, position));
        }
    }

    for blank in &sentence.blanks {
        if first_alternative(&blank.answer).is_empty() {
            return invalid(format!("Exercise {} has blank with empty answer", ex.id));
        }
        if !markers.contains(&blank.position) {
            return invalid(format!(
                "Exercise {} blank {} has no marker in its sentence",
                ex.id, blank.position
            ));
        }
        if ex.kind == ExerciseKind::Dropdown {
            // Reveal selects the first alternative, so it must be offered
            let revealed = first_alternative(&blank.answer);
            if !blank.options.iter().any(|o| o.trim() == revealed) {
                return invalid(format!(
                    "Exercise {} blank {} options do not include {}",
                    ex.id, blank.position, revealed
                ));
            }
            if blank.options.iter().any(|o| o.trim().is_empty()) {
                return invalid(format!("Exercise {} blank {} has an empty option", ex.id, blank.position));
            }
        }
        if !ex.word_bank.is_empty() && !ex.word_bank.iter().any(|w| is_correct(w, &blank.answer)) {
            tracing::warn!(
                "Exercise {} word bank has no accepted answer for blank {}",
                ex.id,
                blank.position
            );
        }
    }

    Ok(())
}
