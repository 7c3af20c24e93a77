use crate::shared::modal_stack::{ModalHost, ModalStackService};
use leptos::prelude::*;

/// Application root.
///
/// The reference browser (card grid) lives outside this crate; it calls
/// [`crate::domain::a002_segmentacion::ui::editor::abrir_editor`] with the
/// descriptor of the reference the planner picked. This shell only provides
/// the modal stack the editor is pushed onto.
#[component]
pub fn App() -> impl IntoView {
    provide_context(ModalStackService::new());

    view! {
        <div class="app-shell">
            <ModalHost />
        </div>
    }
}
