use dioxus::prelude::*;

use crate::context::AppContext;
use crate::vm::{LessonListVm, LessonRowVm};

#[component]
pub fn LessonList(list: LessonListVm) -> Element {
    let ctx = use_context::<AppContext>();

    rsx! {
        div { class: "lessons-page",
            button {
                class: "btn btn-link back-link",
                r#type: "button",
                onclick: move |_| {
                    let _ = ctx.controller().back();
                },
                "← Back to modules"
            }
            section { class: "panel",
                div { class: "panel-banner",
                    h2 { class: "panel-title", "{list.title}" }
                    p { class: "panel-subtitle", "{list.description}" }
                }
                div { class: "panel-body",
                    div { class: "lesson-list-head",
                        h3 { "Lessons" }
                        span { class: "lesson-list-count", "{list.completed_label}" }
                    }
                    div { class: "lesson-list",
                        for row in list.rows {
                            LessonRow { key: "{row.id}", row }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn LessonRow(row: LessonRowVm) -> Element {
    let ctx = use_context::<AppContext>();
    let lesson_id = row.id;

    rsx! {
        button {
            class: "lesson-row",
            r#type: "button",
            onclick: move |_| {
                let _ = ctx.controller().select_lesson(lesson_id);
            },
            span { class: "lesson-number", "{row.number}" }
            div { class: "lesson-row-body",
                h4 { class: "lesson-row-title", "{row.title}" }
                span { class: row.status.class(), "{row.status.label()}" }
            }
            span { class: "lesson-row-play", "▶" }
        }
    }
}
