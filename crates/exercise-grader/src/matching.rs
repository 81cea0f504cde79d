//! Matching-pair engine.
//!
//! A matching exercise shows prompt items (base words) and target items
//! (their paired forms). The learner clicks a prompt, then a target:
//!
//! - a correct pair locks both items as matched for the rest of the session
//! - a wrong pair flags both items incorrect; a [`PendingClear`] is returned
//!   and the host fires it back via [`MatchBoard::apply_clear`] after
//!   [`MISMATCH_CLEAR_DELAY_MS`]
//!
//! Pending clears are keyed by ticket and by the two items they captured.
//! Reset and reveal invalidate every outstanding ticket, so a late timer
//! never touches a board that has been reset.

use serde::{Deserialize, Serialize};

use crate::score::{present, ScoreReport};

/// Delay before a wrong pair's error flags are cleared.
pub const MISMATCH_CLEAR_DELAY_MS: u32 = 1000;

/// Index of an item on its board.
pub type ItemId = usize;

/// Which side of a pair an item is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Base word; `answer_key` is the text of the target it pairs with.
    Prompt { answer_key: String },
    /// Paired form; its own text is its key.
    Target,
}

/// Visual state of a match item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Idle,
    Selected,
    Matched,
    Incorrect,
}

impl ItemState {
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Selected => Some("selected"),
            Self::Matched => Some("matched"),
            Self::Incorrect => Some("incorrect"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchItem {
    pub text: String,
    pub role: Role,
    state: ItemState,
}

impl MatchItem {
    pub fn prompt(text: impl Into<String>, answer_key: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Prompt {
                answer_key: answer_key.into(),
            },
            state: ItemState::Idle,
        }
    }

    pub fn target(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Target,
            state: ItemState::Idle,
        }
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn is_prompt(&self) -> bool {
        matches!(self.role, Role::Prompt { .. })
    }

    fn answer_key(&self) -> Option<&str> {
        match &self.role {
            Role::Prompt { answer_key } => Some(answer_key),
            Role::Target => None,
        }
    }
}

/// One attempted pairing, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub prompt: String,
    pub target: String,
    pub correct: bool,
}

/// Selection state of the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    NoSelection,
    PromptSelected(ItemId),
}

/// A scheduled clear of a wrong pair's error flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClear {
    pub ticket: u64,
    pub prompt: ItemId,
    pub target: ItemId,
}

/// Result of clicking an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing changed.
    Ignored,
    /// A prompt became the current selection.
    Selected(ItemId),
    /// The selected prompt and the clicked target form a correct pair.
    Matched { prompt: ItemId, target: ItemId },
    /// Wrong pair; the host must fire `clear` after the delay.
    Mismatched { clear: PendingClear },
}

/// Per-exercise matching state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchBoard {
    items: Vec<MatchItem>,
    selection: Selection,
    records: Vec<MatchRecord>,
    pending: Vec<PendingClear>,
    next_ticket: u64,
}

impl MatchBoard {
    pub fn new(items: Vec<MatchItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[MatchItem] {
        &self.items
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Tickets that have been scheduled and not yet applied or invalidated.
    pub fn pending(&self) -> &[PendingClear] {
        &self.pending
    }

    /// Number of prompts, the denominator of the score.
    pub fn prompt_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_prompt()).count()
    }

    /// Handle a click on the item at `id`.
    pub fn click(&mut self, id: ItemId) -> ClickOutcome {
        let Some(item) = self.items.get(id) else {
            return ClickOutcome::Ignored;
        };
        if item.state == ItemState::Matched {
            return ClickOutcome::Ignored;
        }

        if item.is_prompt() {
            self.select_prompt(id)
        } else {
            self.pair_with_target(id)
        }
    }

    fn select_prompt(&mut self, id: ItemId) -> ClickOutcome {
        for item in self.items.iter_mut().filter(|i| i.is_prompt()) {
            if item.state == ItemState::Selected {
                item.state = ItemState::Idle;
            }
        }
        self.items[id].state = ItemState::Selected;
        self.selection = Selection::PromptSelected(id);
        ClickOutcome::Selected(id)
    }

    fn pair_with_target(&mut self, target: ItemId) -> ClickOutcome {
        let Selection::PromptSelected(prompt) = self.selection else {
            return ClickOutcome::Ignored;
        };

        let expected = self.items[prompt].answer_key().unwrap_or_default();
        let correct = self.items[target].text == expected;

        self.records.push(MatchRecord {
            prompt: self.items[prompt].text.clone(),
            target: self.items[target].text.clone(),
            correct,
        });

        if correct {
            self.items[prompt].state = ItemState::Matched;
            self.items[target].state = ItemState::Matched;
            self.selection = Selection::NoSelection;
            tracing::debug!(prompt, target, "matched pair");
            return ClickOutcome::Matched { prompt, target };
        }

        self.items[prompt].state = ItemState::Incorrect;
        self.items[target].state = ItemState::Incorrect;

        let clear = PendingClear {
            ticket: self.next_ticket,
            prompt,
            target,
        };
        self.next_ticket += 1;
        self.pending.push(clear);
        tracing::debug!(prompt, target, ticket = clear.ticket, "mismatched pair");

        ClickOutcome::Mismatched { clear }
    }

    /// Apply a scheduled clear. Returns false if the ticket is stale.
    ///
    /// Only the two items captured by the ticket are touched, and only while
    /// they are still flagged incorrect. The selection is dropped only if it
    /// still points at the captured prompt.
    pub fn apply_clear(&mut self, ticket: u64) -> bool {
        let Some(pos) = self.pending.iter().position(|p| p.ticket == ticket) else {
            tracing::debug!(ticket, "ignoring stale clear");
            return false;
        };
        let clear = self.pending.remove(pos);

        for id in [clear.prompt, clear.target] {
            if let Some(item) = self.items.get_mut(id) {
                if item.state == ItemState::Incorrect {
                    item.state = ItemState::Idle;
                }
            }
        }

        if self.selection == Selection::PromptSelected(clear.prompt)
            && self.items[clear.prompt].state != ItemState::Selected
        {
            self.selection = Selection::NoSelection;
        }
        true
    }

    /// Score correct matches against the number of prompts.
    pub fn score(&self) -> ScoreReport {
        let correct = self.records.iter().filter(|r| r.correct).count();
        present(correct, self.prompt_count())
    }

    /// Reset, then pair every prompt with the first unmatched target whose
    /// text equals its answer key.
    pub fn reveal(&mut self) {
        self.reset();

        for prompt in 0..self.items.len() {
            let Some(key) = self.items[prompt].answer_key() else {
                continue;
            };
            let found = self.items.iter().position(|t| {
                !t.is_prompt() && t.state != ItemState::Matched && t.text == key
            });

            match found {
                Some(target) => {
                    self.items[prompt].state = ItemState::Matched;
                    self.items[target].state = ItemState::Matched;
                    self.records.push(MatchRecord {
                        prompt: self.items[prompt].text.clone(),
                        target: self.items[target].text.clone(),
                        correct: true,
                    });
                }
                None => {
                    tracing::warn!(prompt = %self.items[prompt].text, "no target for prompt");
                }
            }
        }
    }

    /// Return every item to idle and drop records, selection and pending clears.
    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.state = ItemState::Idle;
        }
        self.records.clear();
        self.pending.clear();
        self.selection = Selection::NoSelection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Prompts go/eat/see/take/be at 0..5, targets at 5..10.
    fn verb_board() -> MatchBoard {
        MatchBoard::new(vec![
            MatchItem::prompt("go", "went"),
            MatchItem::prompt("eat", "ate"),
            MatchItem::prompt("see", "saw"),
            MatchItem::prompt("take", "took"),
            MatchItem::prompt("be", "was"),
            MatchItem::target("ate"),
            MatchItem::target("took"),
            MatchItem::target("went"),
            MatchItem::target("was"),
            MatchItem::target("saw"),
        ])
    }

    const GO: ItemId = 0;
    const EAT: ItemId = 1;
    const SEE: ItemId = 2;
    const TAKE: ItemId = 3;
    const ATE: ItemId = 5;
    const TOOK: ItemId = 6;
    const WENT: ItemId = 7;
    const SAW: ItemId = 9;

    #[test]
    fn test_correct_match() {
        let mut board = verb_board();

        assert_eq!(board.click(GO), ClickOutcome::Selected(GO));
        assert_eq!(
            board.click(WENT),
            ClickOutcome::Matched {
                prompt: GO,
                target: WENT
            }
        );

        assert_eq!(board.items()[GO].state(), ItemState::Matched);
        assert_eq!(board.items()[WENT].state(), ItemState::Matched);
        assert_eq!(board.records().len(), 1);
        assert!(board.records()[0].correct);
        assert_eq!(board.selection(), Selection::NoSelection);

        // Matched items are inert
        assert_eq!(board.click(GO), ClickOutcome::Ignored);
        assert_eq!(board.click(WENT), ClickOutcome::Ignored);
        assert_eq!(board.items()[GO].state(), ItemState::Matched);
    }

    #[test]
    fn test_wrong_match_then_clear() {
        let mut board = verb_board();
        board.click(GO);

        let ClickOutcome::Mismatched { clear } = board.click(ATE) else {
            panic!("expected mismatch");
        };
        assert_eq!(board.items()[GO].state(), ItemState::Incorrect);
        assert_eq!(board.items()[ATE].state(), ItemState::Incorrect);
        assert_eq!(
            board.records(),
            &[MatchRecord {
                prompt: "go".into(),
                target: "ate".into(),
                correct: false
            }]
        );

        assert!(board.apply_clear(clear.ticket));
        assert_eq!(board.items()[GO].state(), ItemState::Idle);
        assert_eq!(board.items()[ATE].state(), ItemState::Idle);
        assert_eq!(board.selection(), Selection::NoSelection);

        // Both can be used again
        assert_eq!(board.click(EAT), ClickOutcome::Selected(EAT));
        assert!(matches!(board.click(ATE), ClickOutcome::Matched { .. }));
    }

    #[test]
    fn test_clear_fires_once() {
        let mut board = verb_board();
        board.click(GO);
        let ClickOutcome::Mismatched { clear } = board.click(ATE) else {
            panic!("expected mismatch");
        };

        assert!(board.apply_clear(clear.ticket));
        assert!(!board.apply_clear(clear.ticket));
    }

    #[test]
    fn test_clear_keeps_prompt_selected_during_delay() {
        let mut board = verb_board();
        board.click(GO);
        let ClickOutcome::Mismatched { clear } = board.click(ATE) else {
            panic!("expected mismatch");
        };

        // New selection made before the timer fires
        board.click(SEE);
        assert!(board.apply_clear(clear.ticket));

        assert_eq!(board.items()[GO].state(), ItemState::Idle);
        assert_eq!(board.items()[ATE].state(), ItemState::Idle);
        assert_eq!(board.items()[SEE].state(), ItemState::Selected);
        assert_eq!(board.selection(), Selection::PromptSelected(SEE));
    }

    #[test]
    fn test_clear_keeps_reselected_prompt() {
        let mut board = verb_board();
        board.click(GO);
        let ClickOutcome::Mismatched { clear } = board.click(ATE) else {
            panic!("expected mismatch");
        };

        board.click(GO);
        board.apply_clear(clear.ticket);

        assert_eq!(board.items()[GO].state(), ItemState::Selected);
        assert_eq!(board.selection(), Selection::PromptSelected(GO));
    }

    #[test]
    fn test_stale_clear_after_reset_is_ignored() {
        let mut board = verb_board();
        board.click(GO);
        let ClickOutcome::Mismatched { clear } = board.click(ATE) else {
            panic!("expected mismatch");
        };

        board.reset();
        board.click(EAT);
        assert!(!board.apply_clear(clear.ticket));
        assert_eq!(board.items()[EAT].state(), ItemState::Selected);
        assert!(board.pending().is_empty());
    }

    #[test]
    fn test_target_without_selection_is_ignored() {
        let mut board = verb_board();
        assert_eq!(board.click(WENT), ClickOutcome::Ignored);
        assert!(board.records().is_empty());
        assert_eq!(board.click(42), ClickOutcome::Ignored);
    }

    #[test]
    fn test_single_selected_prompt() {
        let mut board = verb_board();
        board.click(GO);
        board.click(EAT);

        let selected: Vec<_> = board
            .items()
            .iter()
            .enumerate()
            .filter(|(_, i)| i.state() == ItemState::Selected)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(selected, vec![EAT]);
    }

    #[test]
    fn test_score_counts_prompts_not_attempts() {
        let mut board = verb_board();
        board.click(GO);
        let ClickOutcome::Mismatched { clear } = board.click(ATE) else {
            panic!("expected mismatch");
        };
        board.apply_clear(clear.ticket);

        for (prompt, target) in [(GO, WENT), (EAT, ATE), (TAKE, TOOK)] {
            board.click(prompt);
            board.click(target);
        }

        assert_eq!(board.records().len(), 4);
        let report = board.score();
        assert_eq!(report.correct, 3);
        assert_eq!(report.total, 5);
        assert_eq!(report.percentage, 60);
    }

    #[test]
    fn test_score_without_prompts() {
        let board = MatchBoard::new(vec![MatchItem::target("went")]);
        assert_eq!(board.score().percentage, 0);
    }

    #[test]
    fn test_reveal_matches_everything() {
        let mut board = verb_board();
        board.click(GO);
        board.click(ATE);
        board.click(SEE);

        board.reveal();

        assert!(board.items().iter().all(|i| i.state() == ItemState::Matched));
        assert_eq!(board.records().len(), 5);
        assert!(board.records().iter().all(|r| r.correct));
        assert_eq!(board.records()[0].target, "went");
        assert_eq!(board.score().percentage, 100);
        assert!(board.pending().is_empty());
    }

    #[test]
    fn test_reveal_with_duplicate_targets() {
        let mut board = MatchBoard::new(vec![
            MatchItem::prompt("read", "read"),
            MatchItem::prompt("put", "put"),
            MatchItem::prompt("reread", "read"),
            MatchItem::target("read"),
            MatchItem::target("put"),
            MatchItem::target("read"),
        ]);
        board.reveal();

        assert!(board.items().iter().all(|i| i.state() == ItemState::Matched));
        assert_eq!(board.records().len(), 3);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut board = verb_board();
        board.click(GO);
        board.click(WENT);
        board.click(SEE);
        board.click(SAW);

        board.reset();
        let once = board.clone();
        board.reset();

        assert_eq!(board, once);
        assert!(board.items().iter().all(|i| i.state() == ItemState::Idle));
        assert!(board.records().is_empty());
        assert_eq!(board.selection(), Selection::NoSelection);
    }
}
