mod auth_vm;
mod course_vm;
mod lesson_vm;
mod quiz_vm;

pub use auth_vm::{AuthMode, AuthNotice, auth_failure_notice, can_submit_credentials, sign_up_notice};
pub use course_vm::{HeaderVm, ModuleCardVm, map_header, map_module_cards};
pub use lesson_vm::{
    LessonAction, LessonListVm, LessonPageVm, LessonRowVm, LessonStatus, map_lesson_list,
    map_lesson_page,
};
pub use quiz_vm::{OptionState, QuizCardVm, QuizOptionVm, QuizResultVm, map_quiz_cards};

#[cfg(test)]
mod fixtures;
