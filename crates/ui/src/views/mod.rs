mod auth_modal;
mod course;
mod header;
mod lesson_list;
mod lesson_view;
mod module_grid;
mod quiz_card;
mod state;

pub use auth_modal::AuthModal;
pub use course::CourseView;
pub use header::Header;
pub use lesson_list::LessonList;
pub use lesson_view::LessonView;
pub use module_grid::ModuleGrid;
pub use quiz_card::QuizCardView;
pub use state::use_viewer_snapshot;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
