//! Answer state of quiz cards and the rule that turns answered quizzes
//! into a completed lesson.

use crate::model::{Quiz, QuizId};

/// What "mark complete" does for a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPlan {
    /// No quizzes: record completion right away.
    MarkNow,
    /// Show the quizzes; completion follows the last submission.
    RevealQuizzes,
}

impl CompletionPlan {
    #[must_use]
    pub fn for_quiz_count(count: usize) -> Self {
        if count == 0 {
            Self::MarkNow
        } else {
            Self::RevealQuizzes
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
    Unanswered,
    OptionChosen(usize),
    Revealed { selected: usize, correct: bool },
}

/// One quiz question and the learner's answer to it.
///
/// `Unanswered → OptionChosen → Revealed`; `Revealed` is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCard {
    quiz: Quiz,
    phase: CardPhase,
}

impl QuizCard {
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            phase: CardPhase::Unanswered,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        match self.phase {
            CardPhase::Unanswered => None,
            CardPhase::OptionChosen(index) | CardPhase::Revealed { selected: index, .. } => {
                Some(index)
            }
        }
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, CardPhase::Revealed { .. })
    }

    /// Correctness of the submitted answer, once revealed.
    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        match self.phase {
            CardPhase::Revealed { correct, .. } => Some(correct),
            _ => None,
        }
    }

    /// Chooses an option. Returns false (and changes nothing) once the card
    /// is revealed or when `index` is not one of the options.
    pub fn select(&mut self, index: usize) -> bool {
        if self.is_revealed() || !self.quiz.has_option(index) {
            return false;
        }
        self.phase = CardPhase::OptionChosen(index);
        true
    }

    /// Reveals the chosen option. Returns the correctness, or `None` when
    /// nothing is selected or the card was already revealed.
    pub fn submit(&mut self) -> Option<bool> {
        let CardPhase::OptionChosen(selected) = self.phase else {
            return None;
        };
        let correct = self.quiz.is_correct(selected);
        self.phase = CardPhase::Revealed { selected, correct };
        Some(correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub correct: bool,
    /// The last quiz of the lesson was just revealed.
    pub completes_lesson: bool,
}

/// The quizzes of one lesson, in sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizSequence {
    cards: Vec<QuizCard>,
    visible: bool,
}

impl QuizSequence {
    /// Builds the sequence, ordering quizzes by `order_index`.
    #[must_use]
    pub fn new(mut quizzes: Vec<Quiz>) -> Self {
        quizzes.sort_by_key(Quiz::order_index);
        Self {
            cards: quizzes.into_iter().map(QuizCard::new).collect(),
            visible: false,
        }
    }

    #[must_use]
    pub fn cards(&self) -> &[QuizCard] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether the quizzes are shown instead of the lesson text.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn completion_plan(&self) -> CompletionPlan {
        CompletionPlan::for_quiz_count(self.cards.len())
    }

    /// Shows the quizzes. No-op for a lesson without quizzes.
    pub fn reveal(&mut self) {
        if !self.cards.is_empty() {
            self.visible = true;
        }
    }

    #[must_use]
    pub fn position_of(&self, quiz_id: QuizId) -> Option<usize> {
        self.cards.iter().position(|card| card.quiz().id() == quiz_id)
    }

    /// Selects an option on the card at `position`.
    pub fn select(&mut self, position: usize, option: usize) -> bool {
        if !self.visible {
            return false;
        }
        self.cards
            .get_mut(position)
            .is_some_and(|card| card.select(option))
    }

    /// Submits the card at `position`. Submitting the last card completes
    /// the lesson whether or not the answer was right.
    pub fn submit(&mut self, position: usize) -> Option<SubmitOutcome> {
        if !self.visible {
            return None;
        }
        let last = self.cards.len().checked_sub(1)?;
        let correct = self.cards.get_mut(position)?.submit()?;
        Some(SubmitOutcome {
            correct,
            completes_lesson: position == last,
        })
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_revealed()).count()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.cards
            .iter()
            .filter(|card| card.is_correct() == Some(true))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LessonId;
    use crate::time::fixed_now;

    fn quiz(order: i32, correct: usize) -> Quiz {
        Quiz::new(
            QuizId::generate(),
            LessonId::generate(),
            format!("Question {order}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            "why",
            order,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn plan_depends_on_quiz_count() {
        assert_eq!(CompletionPlan::for_quiz_count(0), CompletionPlan::MarkNow);
        assert_eq!(
            CompletionPlan::for_quiz_count(2),
            CompletionPlan::RevealQuizzes
        );
    }

    #[test]
    fn submit_without_selection_is_noop() {
        let mut card = QuizCard::new(quiz(0, 2));
        assert_eq!(card.submit(), None);
        assert_eq!(card.phase(), CardPhase::Unanswered);
    }

    #[test]
    fn select_then_submit_reveals_correctness() {
        let mut card = QuizCard::new(quiz(0, 2));
        assert!(card.select(1));
        assert!(card.select(2));
        assert_eq!(card.submit(), Some(true));
        assert_eq!(
            card.phase(),
            CardPhase::Revealed {
                selected: 2,
                correct: true
            }
        );

        let mut wrong = QuizCard::new(quiz(0, 2));
        wrong.select(0);
        assert_eq!(wrong.submit(), Some(false));
        assert_eq!(wrong.is_correct(), Some(false));
    }

    #[test]
    fn revealed_card_is_frozen() {
        let mut card = QuizCard::new(quiz(0, 2));
        card.select(0);
        card.submit();
        let before = card.clone();

        assert!(!card.select(2));
        assert_eq!(card.submit(), None);
        assert_eq!(card, before);
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        let mut card = QuizCard::new(quiz(0, 2));
        assert!(!card.select(9));
        assert_eq!(card.selected(), None);
    }

    #[test]
    fn sequence_orders_by_sort_key() {
        let seq = QuizSequence::new(vec![quiz(2, 0), quiz(0, 0), quiz(1, 0)]);
        let orders: Vec<_> = seq.cards().iter().map(|c| c.quiz().order_index()).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn hidden_sequence_ignores_answers() {
        let mut seq = QuizSequence::new(vec![quiz(0, 1)]);
        assert!(!seq.select(0, 1));
        assert_eq!(seq.submit(0), None);
        seq.reveal();
        assert!(seq.select(0, 1));
    }

    #[test]
    fn only_last_submission_completes_lesson() {
        let mut seq = QuizSequence::new(vec![quiz(0, 1), quiz(1, 3)]);
        seq.reveal();

        seq.select(1, 0);
        let last = seq.submit(1).unwrap();
        assert!(last.completes_lesson);
        assert!(!last.correct);

        seq.select(0, 1);
        let first = seq.submit(0).unwrap();
        assert!(first.correct);
        assert!(!first.completes_lesson);

        assert_eq!(seq.submit(1), None);
        assert_eq!(seq.answered_count(), 2);
        assert_eq!(seq.correct_count(), 1);
    }

    #[test]
    fn reveal_is_noop_without_quizzes() {
        let mut seq = QuizSequence::new(Vec::new());
        seq.reveal();
        assert!(!seq.is_visible());
        assert_eq!(seq.completion_plan(), CompletionPlan::MarkNow);
    }
}
