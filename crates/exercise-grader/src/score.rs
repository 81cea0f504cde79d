//! Score presentation: percentage, band and feedback message.

use serde::{Deserialize, Serialize};

/// Minimum percentage for the "good" band.
pub const GOOD_THRESHOLD: u32 = 80;

/// Minimum percentage for the "average" band.
pub const AVERAGE_THRESHOLD: u32 = 60;

/// Message shown after answers are revealed.
pub const REVEALED_MESSAGE: &str = "All answers revealed! 📖";

/// Base CSS class of the aggregate score display.
pub const SCORE_DISPLAY_CLASS: &str = "eng-score-display";

/// Qualitative score tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Average,
    Poor,
}

impl ScoreBand {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= GOOD_THRESHOLD {
            Self::Good
        } else if percentage >= AVERAGE_THRESHOLD {
            Self::Average
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Average => "average",
            Self::Poor => "poor",
        }
    }

    /// Feedback appended to the score line.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Good => "Excellent! 🎉",
            Self::Average => "Good job! 👍",
            Self::Poor => "Keep practicing! 💪",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rounded percentage of `correct` out of `total`, 0 when `total` is 0.
///
/// Rounds half up, matching how scores are displayed elsewhere.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = (correct as u64 * 200 + total as u64) / (total as u64 * 2);
    pct as u32
}

/// A graded score ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub band: ScoreBand,
    pub message: String,
}

/// Build the score report for `correct` out of `total`.
pub fn present(correct: usize, total: usize) -> ScoreReport {
    let percentage = percentage(correct, total);
    let band = ScoreBand::from_percentage(percentage);
    let message = format!(
        "Score: {}/{} ({}%) - {}",
        correct,
        total,
        percentage,
        band.suffix()
    );

    ScoreReport {
        correct,
        total,
        percentage,
        band,
        message,
    }
}

/// What the exercise's aggregate display currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScoreDisplay {
    #[default]
    Hidden,
    Score(ScoreReport),
    Revealed,
}

impl ScoreDisplay {
    pub fn band(&self) -> Option<ScoreBand> {
        match self {
            Self::Hidden => None,
            Self::Score(report) => Some(report.band),
            Self::Revealed => Some(ScoreBand::Good),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Hidden => "",
            Self::Score(report) => &report.message,
            Self::Revealed => REVEALED_MESSAGE,
        }
    }

    pub fn is_shown(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Full class attribute for the display element.
    pub fn css_class(&self) -> String {
        match self.band() {
            Some(band) => format!("{} show {}", SCORE_DISPLAY_CLASS, band),
            None => SCORE_DISPLAY_CLASS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(4, 5), 80);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 5), 0);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_bands() {
        assert_eq!(present(4, 5).band, ScoreBand::Good);
        assert_eq!(present(3, 5).band, ScoreBand::Average);
        assert_eq!(present(2, 5).band, ScoreBand::Poor);
        assert_eq!(ScoreBand::from_percentage(79), ScoreBand::Average);
        assert_eq!(ScoreBand::from_percentage(59), ScoreBand::Poor);
    }

    #[test]
    fn test_message_format() {
        let report = present(4, 5);
        assert_eq!(report.percentage, 80);
        assert_eq!(report.message, "Score: 4/5 (80%) - Excellent! 🎉");

        assert_eq!(present(3, 5).message, "Score: 3/5 (60%) - Good job! 👍");
        assert_eq!(present(2, 5).message, "Score: 2/5 (40%) - Keep practicing! 💪");
    }

    #[test]
    fn test_empty_exercise_is_poor() {
        let report = present(0, 0);
        assert_eq!(report.percentage, 0);
        assert_eq!(report.band, ScoreBand::Poor);
    }

    #[test]
    fn test_display_classes() {
        assert_eq!(ScoreDisplay::Hidden.css_class(), "eng-score-display");
        assert_eq!(ScoreDisplay::Revealed.css_class(), "eng-score-display show good");
        assert_eq!(
            ScoreDisplay::Score(present(1, 5)).css_class(),
            "eng-score-display show poor"
        );
        assert_eq!(ScoreDisplay::Hidden.message(), "");
        assert_eq!(ScoreDisplay::Revealed.message(), REVEALED_MESSAGE);
    }

    #[test]
    fn test_display_serializes_with_status_tag() {
        let json = serde_json::to_string(&ScoreDisplay::Revealed).unwrap();
        assert_eq!(json, r#"{"status":"revealed"}"#);

        let json = serde_json::to_string(&ScoreDisplay::Score(present(3, 5))).unwrap();
        assert!(json.contains(r#""status":"score""#));
        assert!(json.contains(r#""band":"average""#));
    }
}
