use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question index {index} is out of range (total {total})")]
    QuestionOutOfRange { index: usize, total: usize },

    #[error("option {option} is out of range for question {index} ({count} options)")]
    OptionOutOfRange {
        index: usize,
        option: usize,
        count: usize,
    },
}

/// One answer as sent to the backend on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_index: usize,
    pub selected_answer: Option<usize>,
}

/// Selected option per question, one slot per question index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerSheet {
    slots: Vec<Option<usize>>,
}

impl AnswerSheet {
    /// Sheet with every question unanswered.
    #[must_use]
    pub fn blank(total_questions: usize) -> Self {
        Self {
            slots: vec![None; total_questions],
        }
    }

    /// Rebuild a sheet from persisted slots, padding or truncating to `total_questions`.
    #[must_use]
    pub fn restore(total_questions: usize, mut slots: Vec<Option<usize>>) -> Self {
        slots.resize(total_questions, None);
        Self { slots }
    }

    /// Record `option` for question `index`, replacing any earlier selection.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` for an unknown question index.
    pub fn select(&mut self, index: usize, option: usize) -> Result<(), AnswerError> {
        let slot = self.slot_mut(index)?;
        *slot = Some(option);
        Ok(())
    }

    /// Like [`AnswerSheet::select`], but also bounds `option` by `option_count`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::OptionOutOfRange` if `option >= option_count`,
    /// or `AnswerError::QuestionOutOfRange` for an unknown question index.
    pub fn select_checked(
        &mut self,
        index: usize,
        option: usize,
        option_count: usize,
    ) -> Result<(), AnswerError> {
        if option >= option_count {
            return Err(AnswerError::OptionOutOfRange {
                index,
                option,
                count: option_count,
            });
        }
        self.select(index, option)
    }

    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` for an unknown question index.
    pub fn clear(&mut self, index: usize) -> Result<(), AnswerError> {
        let slot = self.slot_mut(index)?;
        *slot = None;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied().flatten()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.total() - self.answered_count()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Ordered submission payload, unanswered questions included as `None`.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SubmittedAnswer> {
        self.slots
            .iter()
            .enumerate()
            .map(|(question_index, selected_answer)| SubmittedAnswer {
                question_index,
                selected_answer: *selected_answer,
            })
            .collect()
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Option<usize>, AnswerError> {
        let total = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(AnswerError::QuestionOutOfRange { index, total })
    }
}

/// Questions marked "review later". Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlagSet {
    total: usize,
    flagged: BTreeSet<usize>,
}

impl FlagSet {
    #[must_use]
    pub fn empty(total_questions: usize) -> Self {
        Self {
            total: total_questions,
            flagged: BTreeSet::new(),
        }
    }

    /// Rebuild from persisted indices; indices outside the question range are dropped.
    #[must_use]
    pub fn restore(total_questions: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            total: total_questions,
            flagged: indices
                .into_iter()
                .filter(|index| *index < total_questions)
                .collect(),
        }
    }

    /// Flip the flag on `index`, returning whether it is now flagged.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` for an unknown question index.
    pub fn toggle(&mut self, index: usize) -> Result<bool, AnswerError> {
        if index >= self.total {
            return Err(AnswerError::QuestionOutOfRange {
                index,
                total: self.total,
            });
        }
        if self.flagged.remove(&index) {
            Ok(false)
        } else {
            self.flagged.insert(index);
            Ok(true)
        }
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.flagged.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    /// Flagged indices in ascending (original question) order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.flagged.iter().copied().collect()
    }

    /// All question indices, or only flagged ones, preserving question order.
    #[must_use]
    pub fn filter_indices(&self, show_only_flagged: bool) -> Vec<usize> {
        if show_only_flagged {
            self.indices()
        } else {
            (0..self.total).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_sheet_has_one_empty_slot_per_question() {
        let sheet = AnswerSheet::blank(3);
        assert_eq!(sheet.slots(), [None, None, None]);
        assert_eq!(sheet.answered_count(), 0);
        assert_eq!(sheet.remaining_count(), 3);
    }

    #[test]
    fn select_overwrites_and_clear_resets() {
        let mut sheet = AnswerSheet::blank(2);
        sheet.select(0, 1).unwrap();
        sheet.select(0, 3).unwrap();
        assert_eq!(sheet.get(0), Some(3));
        sheet.clear(0).unwrap();
        assert_eq!(sheet.get(0), None);
    }

    #[test]
    fn counts_track_any_sequence_of_mutations() {
        let mut sheet = AnswerSheet::blank(5);
        let ops: [(usize, Option<usize>); 8] = [
            (0, Some(1)),
            (3, Some(0)),
            (0, None),
            (4, Some(2)),
            (4, Some(1)),
            (2, None),
            (1, Some(0)),
            (3, None),
        ];
        for (index, op) in ops {
            match op {
                Some(option) => sheet.select(index, option).unwrap(),
                None => sheet.clear(index).unwrap(),
            }
            let non_null = sheet.slots().iter().filter(|s| s.is_some()).count();
            assert_eq!(sheet.answered_count(), non_null);
            assert_eq!(sheet.answered_count() + sheet.remaining_count(), 5);
        }
        assert_eq!(sheet.answered_count(), 2);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut sheet = AnswerSheet::blank(2);
        assert_eq!(
            sheet.select(2, 0).unwrap_err(),
            AnswerError::QuestionOutOfRange { index: 2, total: 2 }
        );
        assert!(sheet.clear(9).is_err());
        assert_eq!(
            sheet.select_checked(0, 4, 4).unwrap_err(),
            AnswerError::OptionOutOfRange {
                index: 0,
                option: 4,
                count: 4
            }
        );
    }

    #[test]
    fn snapshot_includes_unanswered() {
        let mut sheet = AnswerSheet::blank(3);
        sheet.select(1, 2).unwrap();
        let snapshot = sheet.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].selected_answer, None);
        assert_eq!(snapshot[1].selected_answer, Some(2));
        assert_eq!(snapshot[2].question_index, 2);
    }

    #[test]
    fn restore_pads_and_truncates() {
        let padded = AnswerSheet::restore(3, vec![Some(1)]);
        assert_eq!(padded.slots(), [Some(1), None, None]);
        let truncated = AnswerSheet::restore(1, vec![Some(0), Some(2)]);
        assert_eq!(truncated.slots(), [Some(0)]);
    }

    #[test]
    fn flags_filter_in_question_order() {
        let mut flags = FlagSet::empty(5);
        assert!(flags.toggle(3).unwrap());
        assert!(flags.toggle(1).unwrap());
        assert_eq!(flags.filter_indices(true), vec![1, 3]);
        assert_eq!(flags.filter_indices(false), vec![0, 1, 2, 3, 4]);

        assert!(!flags.toggle(3).unwrap());
        assert_eq!(flags.indices(), vec![1]);
        assert!(flags.toggle(5).is_err());
    }

    #[test]
    fn restore_drops_out_of_range_flags() {
        let flags = FlagSet::restore(3, [0, 2, 7]);
        assert_eq!(flags.indices(), vec![0, 2]);
    }
}
