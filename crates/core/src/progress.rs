//! Lesson-keyed projection of progress records and the counters derived from it.

use std::collections::{HashMap, HashSet};

use crate::model::{Lesson, LessonId, ModuleId, ProgressRecord};

/// Progress records of the active identity, keyed by lesson.
///
/// The map is only ever built wholesale from a fetched record set; there is
/// no way to patch a single entry. A refresh replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressMap {
    records: HashMap<LessonId, ProgressRecord>,
}

impl ProgressMap {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the map from a fetched record set. A later record for the same
    /// lesson replaces an earlier one.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ProgressRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.lesson_id, record))
            .collect();
        Self { records }
    }

    #[must_use]
    pub fn get(&self, lesson_id: LessonId) -> Option<&ProgressRecord> {
        self.records.get(&lesson_id)
    }

    /// True when any record (started or completed) exists for the lesson.
    #[must_use]
    pub fn contains(&self, lesson_id: LessonId) -> bool {
        self.records.contains_key(&lesson_id)
    }

    #[must_use]
    pub fn is_completed(&self, lesson_id: LessonId) -> bool {
        self.records
            .get(&lesson_id)
            .is_some_and(|record| record.completed)
    }

    #[must_use]
    pub fn completed_lesson_ids(&self) -> HashSet<LessonId> {
        self.records
            .values()
            .filter(|record| record.completed)
            .map(|record| record.lesson_id)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Totals over every lesson in `lessons`.
    #[must_use]
    pub fn overall(&self, lessons: &[Lesson]) -> ProgressSummary {
        self.summarize(lessons.iter())
    }

    /// Totals over the lessons of one module.
    #[must_use]
    pub fn for_module(&self, module_id: ModuleId, lessons: &[Lesson]) -> ProgressSummary {
        self.summarize(lessons.iter().filter(|l| l.module_id() == module_id))
    }

    fn summarize<'a>(&self, lessons: impl Iterator<Item = &'a Lesson>) -> ProgressSummary {
        let mut summary = ProgressSummary::default();
        for lesson in lessons {
            summary.total += 1;
            if self.is_completed(lesson.id()) {
                summary.completed += 1;
            }
        }
        summary
    }
}

/// Completed vs. total lesson counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
}

impl ProgressSummary {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        Self { total, completed }
    }

    /// `100 * completed / total`, or 0 when there are no lessons.
    #[must_use]
    pub fn percent(&self) -> f64 {
        completion_percent(self.completed, self.total)
    }

    /// Percentage rounded to the nearest whole number, for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded_percent(&self) -> u32 {
        self.percent().round() as u32
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * completed as f64 / total as f64
}
