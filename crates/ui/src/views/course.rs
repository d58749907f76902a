use course_core::navigation::ViewKind;
use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::state::use_viewer_snapshot;
use crate::views::{AuthModal, Header, LessonList, LessonView, ModuleGrid};
use crate::vm::{map_header, map_lesson_list, map_lesson_page, map_module_cards};

/// Header, the current navigation view, and the sign-in dialog.
#[component]
pub fn CourseView() -> Element {
    let ctx = use_context::<AppContext>();
    let snapshot = use_viewer_snapshot();
    let mut show_auth = use_signal(|| false);

    let snapshot = snapshot.read().clone();
    let stats = map_header(&snapshot);
    let show_overview = snapshot.view == ViewKind::Modules;

    let body = match snapshot.view {
        ViewKind::Modules => rsx! {
            ModuleGrid { modules: map_module_cards(&snapshot.modules) }
        },
        ViewKind::Lessons => match snapshot.selected_module.as_ref() {
            Some(module) => rsx! {
                LessonList { list: map_lesson_list(module, &snapshot.lessons) }
            },
            None => rsx! {},
        },
        ViewKind::Lesson => match snapshot.open_lesson.as_ref() {
            Some(open) => rsx! {
                LessonView { page: map_lesson_page(open) }
            },
            None => rsx! {},
        },
    };

    rsx! {
        div { class: "course-shell",
            Header {
                stats,
                show_overview,
                on_sign_in: move |()| show_auth.set(true),
            }
            main { class: "page", {body} }
            footer { class: "app-footer",
                p { "{ctx.course_tagline()}" }
            }
            if show_auth() {
                AuthModal { on_close: move |()| show_auth.set(false) }
            }
        }
    }
}
