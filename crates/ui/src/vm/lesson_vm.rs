use course_core::model::{LessonId, Module};
use course_core::quiz::CompletionPlan;
use services::{LessonEntry, OpenLesson};

use crate::vm::quiz_vm::{QuizCardVm, map_quiz_cards};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl LessonStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LessonStatus::NotStarted => "Not started",
            LessonStatus::InProgress => "In progress",
            LessonStatus::Completed => "Complete",
        }
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            LessonStatus::NotStarted => "lesson-status lesson-status--new",
            LessonStatus::InProgress => "lesson-status lesson-status--started",
            LessonStatus::Completed => "lesson-status lesson-status--done",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonRowVm {
    pub id: LessonId,
    pub number: usize,
    pub title: String,
    pub status: LessonStatus,
}

impl LessonRowVm {
    fn new(index: usize, entry: &LessonEntry) -> Self {
        let status = if entry.completed {
            LessonStatus::Completed
        } else if entry.started {
            LessonStatus::InProgress
        } else {
            LessonStatus::NotStarted
        };
        Self {
            id: entry.lesson.id(),
            number: index + 1,
            title: entry.lesson.title().to_owned(),
            status,
        }
    }
}

/// The selected module with its lessons in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonListVm {
    pub title: String,
    pub description: String,
    pub completed_label: String,
    pub rows: Vec<LessonRowVm>,
}

#[must_use]
pub fn map_lesson_list(module: &Module, entries: &[LessonEntry]) -> LessonListVm {
    let completed = entries.iter().filter(|entry| entry.completed).count();
    LessonListVm {
        title: module.title().to_owned(),
        description: module.description().to_owned(),
        completed_label: format!("{completed} of {} complete", entries.len()),
        rows: entries
            .iter()
            .enumerate()
            .map(|(index, entry)| LessonRowVm::new(index, entry))
            .collect(),
    }
}

/// What the button under the lesson text does, if it is shown at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonAction {
    /// Quizzes are still loading.
    Pending,
    MarkComplete,
    TakeQuiz,
    Hidden,
}

impl LessonAction {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LessonAction::Pending => "Loading...",
            LessonAction::MarkComplete => "Mark as complete",
            LessonAction::TakeQuiz => "Take the quiz",
            LessonAction::Hidden => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonPageVm {
    pub id: LessonId,
    pub title: String,
    pub status_label: &'static str,
    pub completed: bool,
    /// Content lines; an empty entry is a blank line.
    pub lines: Vec<String>,
    pub action: LessonAction,
    /// Present once the quizzes are shown instead of the lesson text.
    pub quizzes: Option<Vec<QuizCardVm>>,
}

#[must_use]
pub fn map_lesson_page(open: &OpenLesson) -> LessonPageVm {
    let quizzes = open
        .quizzes
        .as_ref()
        .filter(|sequence| sequence.is_visible())
        .map(map_quiz_cards);
    let action = match (&open.quizzes, open.completed) {
        (_, true) => LessonAction::Hidden,
        (None, false) => LessonAction::Pending,
        (Some(sequence), false) if sequence.is_visible() => LessonAction::Hidden,
        (Some(sequence), false) => match sequence.completion_plan() {
            CompletionPlan::MarkNow => LessonAction::MarkComplete,
            CompletionPlan::RevealQuizzes => LessonAction::TakeQuiz,
        },
    };

    LessonPageVm {
        id: open.lesson.id(),
        title: open.lesson.title().to_owned(),
        status_label: if open.completed {
            "Lesson complete"
        } else {
            "In progress"
        },
        completed: open.completed,
        lines: open.lesson.content_lines().map(str::to_owned).collect(),
        action,
        quizzes,
    }
}
