//! Per-question answer tracking.
//!
//! Every question starts unanswered. The first valid selection is final and
//! later selections are ignored.

use super::Question;

/// Answer progress for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnswerState {
    #[default]
    Unanswered,
    Answered { selected: String },
}

/// What happened to a call to [`AnswerState::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The option was recorded as the answer.
    Recorded,
    /// The question was already answered; nothing changed.
    AlreadyAnswered,
    /// The option is not one of the question's options; nothing changed.
    UnknownOption,
}

/// How an option should be presented once its question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOutcome {
    ChosenCorrect,
    ChosenIncorrect,
    /// The correct option, when the user picked something else.
    UnchosenCorrect,
    Neutral,
}

impl AnswerState {
    /// Record `option` as the answer if the question is still open and the
    /// option belongs to it.
    pub fn select(&mut self, question: &Question, option: &str) -> Selection {
        if self.is_answered() {
            return Selection::AlreadyAnswered;
        }
        if !question.has_option(option) {
            return Selection::UnknownOption;
        }

        *self = Self::Answered {
            selected: option.to_string(),
        };
        Selection::Recorded
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered { .. })
    }

    /// The chosen option, once answered.
    pub fn selected_option(&self) -> Option<&str> {
        match self {
            Self::Answered { selected } => Some(selected),
            Self::Unanswered => None,
        }
    }

    /// `None` until the question is answered.
    pub fn is_correct(&self, question: &Question) -> Option<bool> {
        self.selected_option()
            .map(|selected| selected == question.correct_answer)
    }

    /// `None` until the question is answered.
    pub fn option_outcome(&self, question: &Question, option: &str) -> Option<OptionOutcome> {
        let selected = self.selected_option()?;
        let chosen = option == selected;
        let correct = option == question.correct_answer;

        Some(match (chosen, correct) {
            (true, true) => OptionOutcome::ChosenCorrect,
            (true, false) => OptionOutcome::ChosenIncorrect,
            (false, true) => OptionOutcome::UnchosenCorrect,
            (false, false) => OptionOutcome::Neutral,
        })
    }
}
