mod extract;
pub mod model;
pub mod state;
pub mod view;
pub mod view_model;

pub use view::EditorSegmentacion;
pub use view_model::EventoGuardado;

use contracts::domain::a002_segmentacion::aggregate::Referencia;
use leptos::prelude::*;

use crate::shared::modal_stack::ModalStackService;

/// Entry point: push the segmentation editor for one reference onto the
/// modal stack. `on_saved` fires after a successful save, right before the
/// modal closes.
pub fn abrir_editor(
    stack: &ModalStackService,
    referencia: Referencia,
    on_saved: Callback<EventoGuardado>,
) {
    stack.push_with_frame(
        Some("max-width: min(1200px, 95vw); width: min(1200px, 95vw);".to_string()),
        move |handle| {
            let referencia = referencia.clone();
            let cerrar = handle.clone();
            let cerrar_cancel = handle.clone();
            view! {
                <EditorSegmentacion
                    referencia=referencia
                    on_saved=Callback::new(move |evento: EventoGuardado| {
                        on_saved.run(evento);
                        cerrar.close();
                    })
                    on_cancel=Callback::new(move |_| cerrar_cancel.close())
                />
            }
            .into_any()
        },
    );
}
