use dioxus::prelude::*;

use crate::context::AppContext;
use crate::vm::ModuleCardVm;

#[component]
pub fn ModuleGrid(modules: Vec<ModuleCardVm>) -> Element {
    let ctx = use_context::<AppContext>();

    rsx! {
        div { class: "modules-page",
            header { class: "view-header",
                h2 { class: "view-title", "{ctx.course_title()}" }
                p { class: "view-subtitle", "Work through the modules in order, one lesson at a time." }
            }
            if modules.is_empty() {
                p { class: "empty-state", "Loading modules..." }
            } else {
                div { class: "module-grid",
                    for card in modules {
                        ModuleCard { key: "{card.id}", card }
                    }
                }
            }
        }
    }
}

#[component]
fn ModuleCard(card: ModuleCardVm) -> Element {
    let ctx = use_context::<AppContext>();
    let module_id = card.id;

    rsx! {
        button {
            class: "module-card",
            r#type: "button",
            onclick: move |_| {
                // Ignored outside the overview; the next snapshot redraws.
                let _ = ctx.controller().select_module(module_id);
            },
            div { class: "module-card-head",
                h3 { class: "module-card-title", "{card.title}" }
                if card.completed {
                    span { class: "module-card-done", title: "Module complete", "✓" }
                }
            }
            p { class: "module-card-description", "{card.description}" }
            div { class: "module-card-progress",
                span { class: "module-card-count", "{card.progress_label}" }
                span { class: "module-card-percent", "{card.percent_label}" }
            }
            div { class: "progress-track",
                div { class: "progress-fill", style: "width: {card.bar_width}" }
            }
        }
    }
}
