use dioxus::prelude::*;

use crate::context::AppContext;
use crate::vm::QuizCardVm;

#[component]
pub fn QuizCardView(card: QuizCardVm) -> Element {
    let ctx = use_context::<AppContext>();
    let position = card.position;
    let revealed = card.revealed;
    let submit_ctx = ctx.clone();

    let option_buttons = card.options.iter().map(|option| {
        let index = option.index;
        let label = option.label.clone();
        let ctx = ctx.clone();
        rsx! {
            button {
                key: "{index}",
                class: option.state.class(),
                r#type: "button",
                disabled: revealed,
                onclick: move |_| {
                    let _ = ctx.controller().select_answer(position, index);
                },
                "{label}"
            }
        }
    });

    rsx! {
        div { class: "quiz-card",
            div { class: "quiz-card-head",
                span { class: "quiz-number", "{card.number}" }
                h4 { class: "quiz-question", "{card.question}" }
            }
            div { class: "quiz-options", {option_buttons} }
            if !revealed {
                button {
                    class: "btn btn-primary quiz-submit",
                    r#type: "button",
                    disabled: !card.can_submit,
                    onclick: move |_| {
                        // The delayed completion task runs detached.
                        let _ = submit_ctx.controller().submit_answer(position);
                    },
                    "Check answer"
                }
            }
            if let Some(result) = card.result.as_ref() {
                div { class: result.class(),
                    h5 { class: "quiz-result-heading", "{result.heading}" }
                    p { class: "quiz-result-explanation", "{result.explanation}" }
                }
            }
        }
    }
}
