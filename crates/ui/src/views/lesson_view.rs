use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::QuizCardView;
use crate::vm::{LessonAction, LessonPageVm};

#[component]
pub fn LessonView(page: LessonPageVm) -> Element {
    let ctx = use_context::<AppContext>();
    let back_ctx = ctx.clone();
    let action = page.action;
    let status_class = if page.completed {
        "lesson-state lesson-state--done"
    } else {
        "lesson-state"
    };

    rsx! {
        div { class: "lesson-page",
            button {
                class: "btn btn-link back-link",
                r#type: "button",
                onclick: move |_| {
                    let _ = back_ctx.controller().back();
                },
                "← Back to module"
            }
            article { class: "panel",
                div { class: "panel-banner",
                    h2 { class: "panel-title", "{page.title}" }
                    span { class: status_class, "{page.status_label}" }
                }
                div { class: "panel-body",
                    match page.quizzes {
                        Some(cards) => rsx! {
                            div { class: "quiz-section",
                                header { class: "quiz-section-head",
                                    h3 { "Test your knowledge" }
                                    p { "Answer the questions below to lock in what you learned." }
                                }
                                for card in cards {
                                    QuizCardView { key: "{card.position}", card }
                                }
                            }
                        },
                        None => rsx! {
                            div { class: "lesson-content",
                                for line in page.lines {
                                    p { class: "lesson-line", "{line}" }
                                }
                            }
                            if action != LessonAction::Hidden {
                                div { class: "lesson-actions",
                                    button {
                                        class: "btn btn-primary",
                                        r#type: "button",
                                        disabled: action == LessonAction::Pending,
                                        onclick: move |_| {
                                            // The write task runs detached; progress shows up
                                            // with the next snapshot.
                                            let _ = ctx.controller().mark_complete();
                                        },
                                        "{action.label()}"
                                    }
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}
