use course_core::quiz::{CardPhase, QuizCard, QuizSequence};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    Idle,
    Selected,
    /// Revealed: this is the right answer.
    Correct,
    /// Revealed: picked, but wrong.
    Wrong,
}

impl OptionState {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            OptionState::Idle => "quiz-option",
            OptionState::Selected => "quiz-option quiz-option--selected",
            OptionState::Correct => "quiz-option quiz-option--correct",
            OptionState::Wrong => "quiz-option quiz-option--wrong",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizOptionVm {
    pub index: usize,
    pub label: String,
    pub state: OptionState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizResultVm {
    pub correct: bool,
    pub heading: &'static str,
    pub explanation: String,
}

impl QuizResultVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.correct {
            "quiz-result quiz-result--correct"
        } else {
            "quiz-result quiz-result--missed"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizCardVm {
    pub position: usize,
    pub number: usize,
    pub question: String,
    pub options: Vec<QuizOptionVm>,
    pub can_submit: bool,
    pub revealed: bool,
    pub result: Option<QuizResultVm>,
}

impl QuizCardVm {
    #[must_use]
    pub fn new(position: usize, card: &QuizCard) -> Self {
        let quiz = card.quiz();
        let phase = card.phase();
        let options = quiz
            .options()
            .iter()
            .enumerate()
            .map(|(index, label)| QuizOptionVm {
                index,
                label: label.clone(),
                state: option_state(phase, index, quiz.correct_answer()),
            })
            .collect();
        let result = match phase {
            CardPhase::Revealed { correct, .. } => Some(QuizResultVm {
                correct,
                heading: if correct { "Correct!" } else { "Not this time!" },
                explanation: quiz.explanation().to_owned(),
            }),
            _ => None,
        };

        Self {
            position,
            number: position + 1,
            question: quiz.question().to_owned(),
            options,
            can_submit: matches!(phase, CardPhase::OptionChosen(_)),
            revealed: card.is_revealed(),
            result,
        }
    }
}

fn option_state(phase: CardPhase, index: usize, correct_answer: usize) -> OptionState {
    match phase {
        CardPhase::Unanswered => OptionState::Idle,
        CardPhase::OptionChosen(selected) if selected == index => OptionState::Selected,
        CardPhase::OptionChosen(_) => OptionState::Idle,
        CardPhase::Revealed { .. } if index == correct_answer => OptionState::Correct,
        CardPhase::Revealed { selected, .. } if selected == index => OptionState::Wrong,
        CardPhase::Revealed { .. } => OptionState::Idle,
    }
}

#[must_use]
pub fn map_quiz_cards(sequence: &QuizSequence) -> Vec<QuizCardVm> {
    sequence
        .cards()
        .iter()
        .enumerate()
        .map(|(position, card)| QuizCardVm::new(position, card))
        .collect()
}
