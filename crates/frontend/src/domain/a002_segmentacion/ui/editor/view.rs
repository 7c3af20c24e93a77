use contracts::domain::a001_tienda::aggregate::{PerfilTienda, Tienda};
use contracts::domain::a002_segmentacion::aggregate::Referencia;
use leptos::prelude::*;
use thaw::*;

use crate::shared::components::ui::badge::Badge;
use crate::shared::icons::icon;

use super::state::FaseCarga;
use super::view_model::{EditorViewModel, EventoGuardado};

/// Segmentation editor: store/size allocation grid for one reference.
///
/// The caller hands in the immutable reference descriptor and two callbacks;
/// the editor never touches the page around it.
#[component]
pub fn EditorSegmentacion(
    referencia: Referencia,
    on_saved: Callback<EventoGuardado>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    let tallas = referencia.tallas.clone();
    let vm = EditorViewModel::new(referencia);
    vm.cargar();

    let vm_header = vm.clone();
    let vm_error = vm.clone();
    let vm_ultima = vm.clone();
    let vm_fase = vm.clone();
    let vm_filtros = vm.clone();
    let vm_acciones = vm.clone();
    let vm_grid = vm.clone();
    let vm_footer = vm.clone();
    let vm_guardar = vm.clone();

    let colspan_vacio = (7 + tallas.len()).to_string();
    let tallas_cabecera = tallas.clone();
    let tallas_filas = tallas.clone();

    view! {
        <div class="details-container editor-segmentacion">
            <div class="details-header">
                <h3>{vm_header.referencia.descripcion.clone()}</h3>
                <div class="editor-segmentacion__meta">
                    <span class="meta__sku">{vm_header.referencia.referencia_sku.clone()}</span>
                    <span>{vm_header.referencia.linea_texto.clone()}</span>
                    <span>{vm_header.referencia.color.clone()}</span>
                    <span>{format!("$ {:.0}", vm_header.referencia.precio_unitario)}</span>
                </div>
            </div>

            {move || vm_error.error.get().map(|e| view! { <div class="error">{e}</div> })}

            {move || vm_ultima.ultima.get().map(|s| {
                let fecha = s
                    .fecha_creacion
                    .map(|f| f.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "—".to_string());
                view! {
                    <div class="editor-segmentacion__ultima">
                        {format!("Última segmentación guardada: {} ({} tiendas)", fecha, s.detalle.len())}
                    </div>
                }
            })}

            <div class="editor-segmentacion__filtros">
                <FiltroTexto
                    etiqueta="Dependencia"
                    lista_id="sug-dependencia"
                    valor=vm_filtros.f_dependencia
                    sugerencias=Signal::derive({
                        let vm = vm_filtros.clone();
                        move || vm.sugerencias.get().dependencias
                    })
                    on_cambio=Callback::new({
                        let vm = vm_filtros.clone();
                        move |_| vm.programar_recarga(true)
                    })
                />
                <FiltroTexto
                    etiqueta="Zona"
                    lista_id="sug-zona"
                    valor=vm_filtros.f_zona
                    sugerencias=Signal::derive({
                        let vm = vm_filtros.clone();
                        move || vm.sugerencias.get().zonas
                    })
                    on_cambio=Callback::new({
                        let vm = vm_filtros.clone();
                        move |_| vm.programar_recarga(true)
                    })
                />
                <FiltroTexto
                    etiqueta="Clima"
                    lista_id="sug-clima"
                    valor=vm_filtros.f_clima
                    sugerencias=Signal::derive({
                        let vm = vm_filtros.clone();
                        move || vm.sugerencias.get().climas
                    })
                    on_cambio=Callback::new({
                        let vm = vm_filtros.clone();
                        move |_| vm.programar_recarga(true)
                    })
                />
                <FiltroTexto
                    etiqueta="Testeo"
                    lista_id="sug-testeo"
                    valor=vm_filtros.f_testeo
                    sugerencias=Signal::derive({
                        let vm = vm_filtros.clone();
                        move || vm.sugerencias.get().testeos
                    })
                    on_cambio=Callback::new({
                        let vm = vm_filtros.clone();
                        move |_| vm.programar_recarga(true)
                    })
                />
                <FiltroTexto
                    etiqueta="Clasificación"
                    lista_id="sug-clasificacion"
                    valor=vm_filtros.f_clasificacion
                    sugerencias=Signal::derive({
                        let vm = vm_filtros.clone();
                        move || vm.sugerencias.get().clasificaciones
                    })
                    on_cambio=Callback::new({
                        let vm = vm_filtros.clone();
                        move |_| vm.programar_recarga(true)
                    })
                />

                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click={
                        let vm = vm_acciones.clone();
                        move |_| vm.limpiar_filtros()
                    }
                >
                    {icon("x")}
                    "Limpiar filtros"
                </Button>
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click={
                        let vm = vm_acciones.clone();
                        move |_| vm.programar_recarga(false)
                    }
                >
                    {icon("refresh")}
                    "Refrescar"
                </Button>
            </div>

            <div class="editor-segmentacion__acciones">
                <Button
                    appearance=ButtonAppearance::Secondary
                    disabled=Signal::derive({
                        let vm = vm_acciones.clone();
                        move || !vm.tiene_preset()
                    })
                    on_click={
                        let vm = vm_acciones.clone();
                        move |_| vm.aplicar_preset()
                    }
                >
                    {icon("copy")}
                    "Aplicar preset"
                </Button>
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click={
                        let vm = vm_acciones.clone();
                        move |_| vm.activar_todas(true)
                    }
                >
                    {icon("check")}
                    "Activar todas"
                </Button>
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click={
                        let vm = vm_acciones.clone();
                        move |_| vm.activar_todas(false)
                    }
                >
                    {icon("x")}
                    "Desactivar todas"
                </Button>
            </div>

            {move || (vm_fase.fase.get() == FaseCarga::Cargando).then(|| view! {
                <div class="editor-segmentacion__cargando">"Cargando tiendas..."</div>
            })}

            <div class="table-container">
                <table class="table__data table--striped">
                    <thead class="table__head">
                        <tr>
                            <th class="table__header-cell">"Tienda"</th>
                            <th class="table__header-cell">"Ciudad"</th>
                            <th class="table__header-cell">"Zona"</th>
                            <th class="table__header-cell">"Clima"</th>
                            <th class="table__header-cell">"Perfil"</th>
                            <th class="table__header-cell">"Métricas"</th>
                            <th class="table__header-cell">"Activa"</th>
                            {tallas_cabecera.iter().map(|talla| view! {
                                <th class="table__header-cell table__header-cell--talla">{talla.clone()}</th>
                            }).collect_view()}
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            let tiendas = vm_grid.tiendas.get();
                            if tiendas.is_empty() {
                                let mensaje = match vm_grid.fase.get() {
                                    FaseCarga::Renderizada => {
                                        Some("No hay tiendas activas para esta línea con los filtros aplicados.")
                                    }
                                    FaseCarga::Errada => {
                                        Some("No fue posible cargar las tiendas.")
                                    }
                                    _ => None,
                                };
                                mensaje
                                    .map(|m| view! {
                                        <tr>
                                            <td class="table__cell table__cell--vacio" colspan=colspan_vacio.clone()>{m}</td>
                                        </tr>
                                    }.into_any())
                                    .unwrap_or_else(|| view! { <></> }.into_any())
                            } else {
                                let vm = vm_grid.clone();
                                let tallas = tallas_filas.clone();
                                tiendas.into_iter().map(|tienda| {
                                    view! {
                                        <FilaTienda vm=vm.clone() tienda=tienda tallas=tallas.clone() />
                                    }
                                }).collect_view().into_any()
                            }
                        }}
                    </tbody>
                </table>
            </div>

            <div class="editor-segmentacion__resumen">
                <span>
                    "Tiendas activas: "
                    <strong>{
                        let vm = vm_footer.clone();
                        move || vm.estado.get().tiendas_activas()
                    }</strong>
                </span>
                <span>
                    "Unidades asignadas: "
                    <strong>{
                        let vm = vm_footer.clone();
                        move || vm.estado.get().total_unidades()
                    }</strong>
                </span>
            </div>

            <div class="details-actions">
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=Signal::derive({
                        let vm = vm_guardar.clone();
                        move || vm.guardando.get()
                    })
                    on_click={
                        let vm = vm_guardar.clone();
                        move |_| vm.guardar(on_saved)
                    }
                >
                    {icon("save")}
                    {
                        let vm = vm_guardar.clone();
                        move || if vm.guardando.get() { "Guardando..." } else { "Guardar segmentación" }
                    }
                </Button>
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| on_cancel.run(())
                >
                    {icon("cancel")}
                    "Cancelar"
                </Button>
            </div>
        </div>
    }
}

/// One filter input with its suggestion datalist.
#[component]
fn FiltroTexto(
    etiqueta: &'static str,
    lista_id: &'static str,
    valor: RwSignal<String>,
    #[prop(into)] sugerencias: Signal<Vec<String>>,
    on_cambio: Callback<()>,
) -> impl IntoView {
    view! {
        <div class="filtro">
            <label>{etiqueta}</label>
            <input
                type="text"
                list=lista_id
                placeholder="Todas"
                prop:value=move || valor.get()
                on:input=move |ev| {
                    valor.set(event_target_value(&ev));
                    on_cambio.run(());
                }
            />
            <datalist id=lista_id>
                {move || sugerencias.get().into_iter().map(|v| view! {
                    <option value=v></option>
                }).collect_view()}
            </datalist>
        </div>
    }
}

/// One store row: meta columns, profile badge, active toggle and one
/// quantity cell per size.
#[component]
fn FilaTienda(vm: EditorViewModel, tienda: Tienda, tallas: Vec<String>) -> impl IntoView {
    let llave = tienda.llave_naval.clone();
    let nombre = tienda.nombre().to_string();
    let perfil = tienda.perfil();
    let rankin = tienda.rankin_linea.clone().unwrap_or_else(|| "NA".into());

    let variante = match perfil {
        PerfilTienda::Alta => "success",
        PerfilTienda::Media => "warning",
        PerfilTienda::Baja => "error",
    };

    let metricas = format!(
        "VP {} · CPD {} · IR {}",
        formatear_metrica(tienda.venta_promedio),
        formatear_metrica(tienda.cpd),
        formatear_metrica(tienda.indice_rotacion),
    );

    let vm_toggle = vm.clone();
    let llave_toggle = llave.clone();
    let vm_checked = vm.clone();
    let llave_checked = llave.clone();

    view! {
        <tr class="table__row">
            <td class="table__cell">
                <div class="tienda__nombre">{nombre}</div>
                <div class="tienda__llave">{llave.clone()}</div>
            </td>
            <td class="table__cell">{tienda.ciudad.clone().unwrap_or_else(|| "—".into())}</td>
            <td class="table__cell">{tienda.zona.clone().unwrap_or_else(|| "—".into())}</td>
            <td class="table__cell">{tienda.clima.clone().unwrap_or_else(|| "—".into())}</td>
            <td class="table__cell">
                <Badge variant=variante.to_string()>{rankin}</Badge>
            </td>
            <td class="table__cell table__cell--metricas">{metricas}</td>
            <td class="table__cell">
                <input
                    type="checkbox"
                    prop:checked=move || vm_checked.estado.get().esta_activa(&llave_checked)
                    on:change=move |ev| {
                        vm_toggle.alternar_tienda(&llave_toggle, event_target_checked(&ev));
                    }
                />
            </td>
            {tallas.into_iter().map(|talla| view! {
                <CeldaCantidad vm=vm.clone() llave=llave.clone() talla=talla />
            }).collect_view()}
        </tr>
    }
}

/// Quantity input for one (store, size) cell; disabled while the store is
/// inactive.
#[component]
fn CeldaCantidad(vm: EditorViewModel, llave: String, talla: String) -> impl IntoView {
    let vm_valor = vm.clone();
    let llave_valor = llave.clone();
    let talla_valor = talla.clone();
    let vm_activa = vm.clone();
    let llave_activa = llave.clone();

    view! {
        <td class="table__cell table__cell--cantidad">
            <input
                type="number"
                min="0"
                step="1"
                prop:value=move || vm_valor.estado.get().cantidad(&llave_valor, &talla_valor).to_string()
                disabled=move || !vm_activa.estado.get().esta_activa(&llave_activa)
                on:input=move |ev| {
                    vm.editar_cantidad(&llave, &talla, &event_target_value(&ev));
                }
            />
        </td>
    }
}

fn formatear_metrica(valor: Option<f64>) -> String {
    match valor {
        Some(v) => format!("{:.1}", v),
        None => "—".to_string(),
    }
}
