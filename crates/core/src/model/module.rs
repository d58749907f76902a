use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::ModuleId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,
}

/// A top-level unit of the course, grouping an ordered set of lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: String,
    description: String,
    order_index: i32,
    created_at: DateTime<Utc>,
}

impl Module {
    /// Creates a module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyTitle` if the title is blank.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        description: impl Into<String>,
        order_index: i32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ModuleError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModuleError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            order_index,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Position of the module in the course listing (ascending).
    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
