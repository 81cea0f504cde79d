//! Blank and dropdown fields: grading, reveal, reset and sizing.

use serde::{Deserialize, Serialize};

use crate::answer::{first_alternative, is_correct};
use crate::score::{present, ScoreReport};

/// Pixels per character of the declared minimum length.
const MIN_WIDTH_PER_CHAR: u32 = 10;
/// Pixels per character of typed content.
const CONTENT_WIDTH_PER_CHAR: u32 = 12;
/// Padding added to every width.
const WIDTH_PADDING: u32 = 20;

/// Grading class of a field. Correct and Incorrect never coexist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGrade {
    #[default]
    Ungraded,
    Correct,
    Incorrect,
}

impl FieldGrade {
    /// CSS class for the grade, if any.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            Self::Ungraded => None,
            Self::Correct => Some("correct"),
            Self::Incorrect => Some("incorrect"),
        }
    }
}

/// Default width of an empty blank.
pub fn default_width(min_length: u32) -> u32 {
    min_length
        .saturating_mul(MIN_WIDTH_PER_CHAR)
        .saturating_add(WIDTH_PADDING)
}

/// Width of a blank holding `content`, never narrower than its default.
pub fn content_width(min_length: u32, content: &str) -> u32 {
    let chars = u32::try_from(content.chars().count()).unwrap_or(u32::MAX);
    let typed = chars
        .saturating_mul(CONTENT_WIDTH_PER_CHAR)
        .saturating_add(WIDTH_PADDING);
    default_width(min_length).max(typed)
}

/// The blank a word-bank click should fill.
///
/// Clicking a word chip blurs the blank first, so the blank that last had
/// focus is kept until focus moves to something that is not a blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankFocus<T> {
    last: Option<T>,
}

impl<T> Default for BlankFocus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlankFocus<T> {
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub fn focus_blank(&mut self, blank: T) {
        self.last = Some(blank);
    }

    /// Focus moved to a control that is not a blank.
    pub fn focus_other(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

/// A single blank or dropdown control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub user_value: String,
    pub answer_key: String,
    pub min_length: u32,
    grade: FieldGrade,
}

impl Field {
    pub fn new(answer_key: impl Into<String>, min_length: u32) -> Self {
        Self {
            user_value: String::new(),
            answer_key: answer_key.into(),
            min_length,
            grade: FieldGrade::Ungraded,
        }
    }

    pub fn grade(&self) -> FieldGrade {
        self.grade
    }

    /// Current presentation width in pixels.
    pub fn width(&self) -> u32 {
        if self.user_value.is_empty() {
            default_width(self.min_length)
        } else {
            content_width(self.min_length, &self.user_value)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_value.trim().is_empty()
    }

    /// Grade the current value, returning whether it is correct.
    fn check(&mut self) -> bool {
        let correct = is_correct(&self.user_value, &self.answer_key);
        self.grade = if correct {
            FieldGrade::Correct
        } else {
            FieldGrade::Incorrect
        };
        correct
    }

    fn reveal(&mut self) {
        self.user_value = first_alternative(&self.answer_key).to_string();
        self.grade = FieldGrade::Correct;
    }

    fn reset(&mut self) {
        self.user_value.clear();
        self.grade = FieldGrade::Ungraded;
    }
}

/// The fields of one fill-blank or dropdown exercise, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replace a field's value from user input. Out-of-range indices are ignored.
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.user_value = value.into();
        }
    }

    /// Grade every field and score the set.
    pub fn grade(&mut self) -> ScoreReport {
        let total = self.fields.len();
        let correct = self.fields.iter_mut().map(Field::check).filter(|&ok| ok).count();

        tracing::debug!(correct, total, "graded field set");
        present(correct, total)
    }

    /// Fill every field with the first alternative of its key.
    pub fn reveal(&mut self) {
        for field in &mut self.fields {
            field.reveal();
        }
    }

    /// Clear every value and grade.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
    }

    /// Place a word-bank word into the focused field, or else the first empty one.
    ///
    /// Returns the index of the field written to.
    pub fn place_word(&mut self, word: &str, focused: Option<usize>) -> Option<usize> {
        let target = focused
            .filter(|&i| i < self.fields.len())
            .or_else(|| self.fields.iter().position(Field::is_empty))?;

        self.fields[target].user_value = word.to_string();
        Some(target)
    }

    /// Index of the field after `index`, if there is one.
    pub fn next_field(&self, index: usize) -> Option<usize> {
        let next = index + 1;
        (next < self.fields.len()).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScoreBand;

    fn five_fields(answers: [&str; 5]) -> FieldSet {
        let keys = ["went", "ate / had", "saw", "took", "was/were"];
        let mut set = FieldSet::new(keys.iter().map(|k| Field::new(*k, 4)).collect());
        for (i, answer) in answers.iter().enumerate() {
            set.set_value(i, *answer);
        }
        set
    }

    #[test]
    fn test_grade_four_of_five() {
        let mut set = five_fields(["went", "had", "saw", "took", "is"]);
        let report = set.grade();

        assert_eq!(report.correct, 4);
        assert_eq!(report.percentage, 80);
        assert_eq!(report.band, ScoreBand::Good);
        assert_eq!(set.fields()[4].grade(), FieldGrade::Incorrect);
        assert_eq!(set.fields()[1].grade(), FieldGrade::Correct);
    }

    #[test]
    fn test_grade_three_of_five_is_average() {
        let mut set = five_fields(["went", "ATE", " saw ", "", "be"]);
        let report = set.grade();

        assert_eq!(report.percentage, 60);
        assert_eq!(report.band, ScoreBand::Average);
    }

    #[test]
    fn test_grade_two_of_five_is_poor() {
        let mut set = five_fields(["went", "eat", "see", "take", "were"]);
        let report = set.grade();

        assert_eq!(report.percentage, 40);
        assert_eq!(report.band, ScoreBand::Poor);
    }

    #[test]
    fn test_regrade_switches_class() {
        let mut set = five_fields(["go", "", "", "", ""]);
        set.grade();
        assert_eq!(set.fields()[0].grade(), FieldGrade::Incorrect);

        set.set_value(0, "went");
        set.grade();
        assert_eq!(set.fields()[0].grade(), FieldGrade::Correct);
    }

    #[test]
    fn test_grade_empty_set() {
        let mut set = FieldSet::default();
        let report = set.grade();
        assert_eq!(report.total, 0);
        assert_eq!(report.percentage, 0);
    }

    #[test]
    fn test_reveal_uses_first_alternative() {
        let mut set = five_fields(["x", "y", "z", "", ""]);
        set.grade();
        set.reveal();

        let values: Vec<_> = set.fields().iter().map(|f| f.user_value.as_str()).collect();
        assert_eq!(values, vec!["went", "ate", "saw", "took", "was"]);
        assert!(set.fields().iter().all(|f| f.grade() == FieldGrade::Correct));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut set = five_fields(["went", "x", "saw", "", ""]);
        set.grade();
        set.reset();
        let once = set.clone();
        set.reset();

        assert_eq!(set, once);
        assert!(set.fields().iter().all(|f| f.user_value.is_empty()));
        assert!(set.fields().iter().all(|f| f.grade() == FieldGrade::Ungraded));
    }

    #[test]
    fn test_widths() {
        assert_eq!(default_width(4), 60);
        assert_eq!(content_width(4, "go"), 60);
        assert_eq!(content_width(4, "understood"), 140);

        let mut field = Field::new("went", 3);
        assert_eq!(field.width(), 50);
        field.user_value = "went".into();
        assert_eq!(field.width(), 68);
    }

    #[test]
    fn test_place_word_prefers_focused() {
        let mut set = five_fields(["went", "", "", "", ""]);
        assert_eq!(set.place_word("saw", Some(3)), Some(3));
        assert_eq!(set.fields()[3].user_value, "saw");
    }

    #[test]
    fn test_place_word_falls_back_to_first_empty() {
        let mut set = five_fields(["went", "  ", "", "", ""]);
        assert_eq!(set.place_word("ate", None), Some(1));
        assert_eq!(set.fields()[1].user_value, "ate");

        let mut full = five_fields(["a", "b", "c", "d", "e"]);
        assert_eq!(full.place_word("ate", None), None);
    }

    #[test]
    fn test_widths_saturate() {
        assert_eq!(default_width(u32::MAX), u32::MAX);
        assert_eq!(content_width(u32::MAX, "went"), u32::MAX);
        assert_eq!(Field::new("went", u32::MAX).width(), u32::MAX);
    }

    #[test]
    fn test_blank_focus_cleared_by_other_control() {
        let mut focus = BlankFocus::new();
        assert_eq!(focus.last(), None);

        focus.focus_blank(0);
        focus.focus_blank(2);
        assert_eq!(focus.last(), Some(&2));

        // Tabbing to a button or dropdown forgets the blank
        focus.focus_other();
        assert_eq!(focus.last(), None);

        let mut set = five_fields(["went", "", "", "", ""]);
        assert_eq!(set.place_word("ate", focus.last().copied()), Some(1));
        assert_eq!(set.fields()[0].user_value, "went");
    }

    #[test]
    fn test_next_field() {
        let set = five_fields(["", "", "", "", ""]);
        assert_eq!(set.next_field(0), Some(1));
        assert_eq!(set.next_field(4), None);
    }
}
