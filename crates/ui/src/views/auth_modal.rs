use dioxus::prelude::*;
use services::auth::MIN_PASSWORD_LEN;

use crate::context::AppContext;
use crate::vm::{AuthMode, AuthNotice, auth_failure_notice, can_submit_credentials, sign_up_notice};

#[component]
pub fn AuthModal(on_close: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut mode = use_signal(|| AuthMode::SignIn);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut busy = use_signal(|| false);
    let mut notice = use_signal(|| None::<AuthNotice>);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() || !can_submit_credentials(&email.read(), &password.read()) {
            return;
        }
        let controller = ctx.controller();
        let current_mode = mode();
        let email_value = email.read().trim().to_owned();
        let password_value = password.read().clone();

        spawn(async move {
            busy.set(true);
            notice.set(None);
            let result = match current_mode {
                AuthMode::SignIn => controller.sign_in(&email_value, &password_value).await,
                AuthMode::SignUp => controller.sign_up(&email_value, &password_value).await,
            };
            busy.set(false);

            match (current_mode, result) {
                (_, Err(err)) => notice.set(Some(auth_failure_notice(&err))),
                (AuthMode::SignUp, Ok(())) => {
                    notice.set(Some(sign_up_notice()));
                    mode.set(AuthMode::SignIn);
                }
                (AuthMode::SignIn, Ok(())) => on_close.call(()),
            }
        });
    };

    let current_mode = mode();
    let submit_label = if busy() {
        "Working..."
    } else {
        current_mode.title()
    };
    let shown_notice = notice();
    let submit_disabled = busy() || !can_submit_credentials(&email.read(), &password.read());

    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal auth-modal", role: "dialog",
                div { class: "modal-head",
                    h2 { class: "modal-title", "{current_mode.title()}" }
                    p { class: "modal-subtitle", "{current_mode.subtitle()}" }
                    button {
                        class: "modal-close",
                        r#type: "button",
                        aria_label: "Close",
                        onclick: move |_| on_close.call(()),
                        "×"
                    }
                }
                form { class: "auth-form", onsubmit: on_submit,
                    label { class: "field-label", r#for: "auth-email", "Email" }
                    input {
                        id: "auth-email",
                        class: "field-input",
                        r#type: "email",
                        placeholder: "you@example.com",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                    label { class: "field-label", r#for: "auth-password", "Password" }
                    input {
                        id: "auth-password",
                        class: "field-input",
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                    if current_mode == AuthMode::SignUp {
                        p { class: "field-hint", "At least {MIN_PASSWORD_LEN} characters" }
                    }
                    if let Some(shown) = shown_notice {
                        div { class: shown.class(), "{shown.text()}" }
                    }
                    button {
                        class: "btn btn-primary auth-submit",
                        r#type: "submit",
                        disabled: submit_disabled,
                        "{submit_label}"
                    }
                }
                button {
                    class: "btn btn-link auth-toggle",
                    r#type: "button",
                    onclick: move |_| {
                        mode.set(current_mode.toggled());
                        notice.set(None);
                    },
                    "{current_mode.toggle_label()}"
                }
            }
        }
    }
}
