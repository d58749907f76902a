use dioxus::prelude::*;

use crate::context::AppContext;
use crate::vm::HeaderVm;

/// Course branding. Account actions and totals only show on the module
/// overview.
#[component]
pub fn Header(
    stats: HeaderVm,
    show_overview: bool,
    on_sign_in: EventHandler<()>,
) -> Element {
    let ctx = use_context::<AppContext>();
    let title = ctx.course_title().to_owned();
    let tagline = ctx.course_tagline().to_owned();
    let mut logging_out = use_signal(|| false);

    let on_logout = move |_: MouseEvent| {
        if logging_out() {
            return;
        }
        let controller = ctx.controller();
        spawn(async move {
            logging_out.set(true);
            // A failed sign-out keeps the session; the header still offers logout.
            let _ = controller.logout().await;
            logging_out.set(false);
        });
    };

    rsx! {
        header { class: "app-header",
            div { class: "brand",
                div { class: "brand-mark", "◆" }
                div {
                    h1 { class: "brand-title", "{title}" }
                    p { class: "brand-tagline", "{tagline}" }
                }
            }
            if show_overview {
                div { class: "header-actions",
                    if stats.signed_in {
                        if let Some(label) = stats.account_label.clone() {
                            span { class: "account-label", "{label}" }
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: logging_out(),
                            onclick: on_logout,
                            "Log out"
                        }
                    } else {
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| on_sign_in.call(()),
                            "Sign in / Create account"
                        }
                    }
                    div { class: "header-stat",
                        p { class: "header-stat-label", "Overall progress" }
                        p { class: "header-stat-value", "{stats.percent_label}" }
                    }
                    div { class: "header-stat",
                        p { class: "header-stat-label", "Lessons complete" }
                        p { class: "header-stat-value", "{stats.lessons_label}" }
                    }
                }
            }
        }
    }
}
