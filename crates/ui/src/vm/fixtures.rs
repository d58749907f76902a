use course_core::model::{Lesson, LessonId, Module, ModuleId, Quiz, QuizId};
use course_core::time::fixed_now;

pub fn module(title: &str) -> Module {
    Module::new(
        ModuleId::generate(),
        title,
        "What a prompt is made of",
        1,
        fixed_now(),
    )
    .unwrap()
}

pub fn lesson(module_id: ModuleId, title: &str, content: &str, order_index: i32) -> Lesson {
    Lesson::new(
        LessonId::generate(),
        module_id,
        title,
        content,
        order_index,
        fixed_now(),
    )
    .unwrap()
}

pub fn quiz(lesson_id: LessonId, question: &str, order_index: i32) -> Quiz {
    Quiz::new(
        QuizId::generate(),
        lesson_id,
        question,
        vec!["Guess".into(), "Be specific".into(), "Shout".into()],
        1,
        "Specific prompts leave less to chance.",
        order_index,
        fixed_now(),
    )
    .unwrap()
}
