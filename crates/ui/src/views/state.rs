use dioxus::prelude::*;
use services::ViewerSnapshot;

use crate::context::AppContext;

/// Latest controller snapshot; re-read whenever the controller's revision
/// counter moves.
pub fn use_viewer_snapshot() -> Signal<ViewerSnapshot> {
    let ctx = use_context::<AppContext>();
    let initial = ctx.controller();
    let mut snapshot = use_signal(move || initial.snapshot());

    use_hook(move || {
        let controller = ctx.controller();
        let mut revisions = controller.subscribe();
        spawn(async move {
            while revisions.changed().await.is_ok() {
                let _ = revisions.borrow_and_update();
                snapshot.set(controller.snapshot());
            }
        });
    });

    snapshot
}
