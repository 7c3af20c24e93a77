//! View model of the segmentation editor: owns the signals, drives the load
//! sequence and hosts the commands the view wires to its controls.
//!
//! One instance per open editor; nothing is shared between instances, so
//! several editors (or tests) can coexist.

use contracts::domain::a001_tienda::aggregate::Tienda;
use contracts::domain::a002_segmentacion::aggregate::{
    GuardarSegmentacionRequest, GuardarSegmentacionResponse, Referencia, SegmentacionGuardada,
};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::model::{self, Filtros};
use super::state::{
    coaccionar_cantidad, EstadoAsignacion, FaseCarga, GuardiaRecarga, Sugerencias,
};

/// Quiet period for filter-driven refetches. Explicit actions (open, clear,
/// refresh) bypass it.
const DEBOUNCE_MS: u32 = 250;

/// Domain notification emitted after a successful save, so the surrounding
/// page can refresh its aggregate counters without the editor knowing about
/// the page.
#[derive(Debug, Clone)]
pub struct EventoGuardado {
    pub referencia_sku: String,
    pub respuesta: GuardarSegmentacionResponse,
}

#[derive(Clone)]
pub struct EditorViewModel {
    pub referencia: Referencia,

    pub tiendas: RwSignal<Vec<Tienda>>,
    pub estado: RwSignal<EstadoAsignacion>,
    pub fase: RwSignal<FaseCarga>,
    pub error: RwSignal<Option<String>>,
    pub guardando: RwSignal<bool>,
    pub ultima: RwSignal<Option<SegmentacionGuardada>>,
    pub sugerencias: RwSignal<Sugerencias>,

    // filter inputs, bound 1:1 to the controls
    pub f_dependencia: RwSignal<String>,
    pub f_zona: RwSignal<String>,
    pub f_clima: RwSignal<String>,
    pub f_testeo: RwSignal<String>,
    pub f_clasificacion: RwSignal<String>,

    guardia: StoredValue<GuardiaRecarga>,
    carga_inicial: StoredValue<bool>,
}

impl EditorViewModel {
    pub fn new(referencia: Referencia) -> Self {
        Self {
            referencia,
            tiendas: RwSignal::new(Vec::new()),
            estado: RwSignal::new(EstadoAsignacion::new()),
            fase: RwSignal::new(FaseCarga::Inactiva),
            error: RwSignal::new(None),
            guardando: RwSignal::new(false),
            ultima: RwSignal::new(None),
            sugerencias: RwSignal::new(Sugerencias::default()),
            f_dependencia: RwSignal::new(String::new()),
            f_zona: RwSignal::new(String::new()),
            f_clima: RwSignal::new(String::new()),
            f_testeo: RwSignal::new(String::new()),
            f_clasificacion: RwSignal::new(String::new()),
            guardia: StoredValue::new(GuardiaRecarga::new()),
            carga_inicial: StoredValue::new(true),
        }
    }

    fn despachar(&self) -> u64 {
        let mut guardia = self.guardia.get_value();
        let ticket = guardia.despachar();
        self.guardia.set_value(guardia);
        ticket
    }

    fn es_vigente(&self, ticket: u64) -> bool {
        self.guardia.get_value().es_vigente(ticket)
    }

    fn filtros(&self) -> Filtros {
        Filtros {
            dependencia: self.f_dependencia.get_untracked(),
            zona: self.f_zona.get_untracked(),
            clima: self.f_clima.get_untracked(),
            testeo: self.f_testeo.get_untracked(),
            clasificacion: self.f_clasificacion.get_untracked(),
        }
    }

    /// Line used to scope the store query: raw value from the source system,
    /// falling back to the display text.
    fn linea_consulta(&self) -> String {
        if !self.referencia.linea.trim().is_empty() {
            self.referencia.linea.clone()
        } else {
            self.referencia.linea_texto.clone()
        }
    }

    fn aplicar_tiendas(&self, tiendas: Vec<Tienda>) {
        self.sugerencias.set(Sugerencias::desde_tiendas(&tiendas));
        self.tiendas.set(tiendas);
        self.error.set(None);
        self.fase.set(FaseCarga::Renderizada);
        // once anything rendered, later refetch errors keep the grid
        self.carga_inicial.set_value(false);
    }

    /// Initial load: reset everything, fetch stores, then merge the latest
    /// saved segmentation. The prior-allocation fetch runs strictly after
    /// the store fetch and is not cancellable.
    pub fn cargar(&self) {
        self.estado.update(|e| e.reiniciar());
        self.tiendas.set(Vec::new());
        self.sugerencias.set(Sugerencias::default());
        self.ultima.set(None);
        self.error.set(None);
        self.carga_inicial.set_value(true);

        let ticket = self.despachar();
        self.fase.set(FaseCarga::Cargando);

        let vm = self.clone();
        spawn_local(async move {
            let resultado = model::tiendas_activas(&vm.linea_consulta(), &vm.filtros()).await;
            if !vm.es_vigente(ticket) {
                return;
            }
            match resultado {
                Ok(tiendas) => vm.aplicar_tiendas(tiendas),
                Err(e) => {
                    vm.tiendas.set(Vec::new());
                    vm.fase.set(FaseCarga::Errada);
                    vm.error.set(Some(e.to_string()));
                    return;
                }
            }

            match model::ultima_segmentacion(&vm.referencia.referencia_sku).await {
                Ok(Some(segmentacion)) => {
                    vm.estado.update(|e| e.fusionar_detalle(&segmentacion.detalle));
                    vm.ultima.set(Some(segmentacion));
                }
                Ok(None) => {}
                Err(e) => {
                    // not fatal: the grid stays rendered, the banner reports it
                    vm.error
                        .set(Some(format!("No se pudo leer la última segmentación: {}", e)));
                }
            }
        });
    }

    /// Refetch the store list. With `con_debounce`, waits out the quiet
    /// period first; a newer dispatch invalidates the ticket, which cancels
    /// both pending debounces and out-of-order responses.
    pub fn programar_recarga(&self, con_debounce: bool) {
        let ticket = self.despachar();
        let vm = self.clone();
        spawn_local(async move {
            if con_debounce {
                TimeoutFuture::new(DEBOUNCE_MS).await;
                if !vm.es_vigente(ticket) {
                    return;
                }
            }
            vm.fase.set(FaseCarga::Cargando);
            let resultado = model::tiendas_activas(&vm.linea_consulta(), &vm.filtros()).await;
            if !vm.es_vigente(ticket) {
                return;
            }
            match resultado {
                Ok(tiendas) => vm.aplicar_tiendas(tiendas),
                Err(e) => {
                    // refetch errors keep the last rendered grid; only the
                    // initial load clears it
                    if vm.carga_inicial.get_value() {
                        vm.tiendas.set(Vec::new());
                    }
                    vm.fase.set(FaseCarga::Errada);
                    vm.error.set(Some(e.to_string()));
                }
            }
        });
    }

    /// Clear the filter inputs and refetch immediately. Entered quantities
    /// are kept: filters scope visibility, not allocation.
    pub fn limpiar_filtros(&self) {
        self.f_dependencia.set(String::new());
        self.f_zona.set(String::new());
        self.f_clima.set(String::new());
        self.f_testeo.set(String::new());
        self.f_clasificacion.set(String::new());
        self.programar_recarga(false);
    }

    pub fn alternar_tienda(&self, llave: &str, activa: bool) {
        self.estado
            .update(|e| e.set_tienda_activa(llave, activa, false));
    }

    /// Bulk toggle over the loaded stores. Bulk deactivation also resets the
    /// quantities, so "Desactivar todas" leaves a clean sheet.
    pub fn activar_todas(&self, activa: bool) {
        let llaves: Vec<String> = self
            .tiendas
            .get_untracked()
            .iter()
            .map(|t| t.llave_naval.clone())
            .collect();
        self.estado.update(|e| {
            e.set_todas_activas(llaves.iter().map(|s| s.as_str()), activa, !activa);
        });
    }

    pub fn tiene_preset(&self) -> bool {
        self.referencia
            .preset
            .as_ref()
            .map(|p| !p.is_empty())
            .unwrap_or(false)
    }

    /// Copy the reference preset into every loaded store. No-op without one.
    pub fn aplicar_preset(&self) {
        let Some(preset) = self.referencia.preset.clone() else {
            return;
        };
        let tallas = self.referencia.tallas.clone();
        let llaves: Vec<String> = self
            .tiendas
            .get_untracked()
            .iter()
            .map(|t| t.llave_naval.clone())
            .collect();
        self.estado.update(|e| {
            e.aplicar_preset(llaves.iter().map(|s| s.as_str()), &tallas, &preset);
        });
    }

    pub fn editar_cantidad(&self, llave: &str, talla: &str, crudo: &str) {
        let cantidad = coaccionar_cantidad(crudo);
        self.estado.update(|e| {
            e.set_cantidad(llave, talla, cantidad);
        });
    }

    /// Build and submit the save request. Validation failures are local and
    /// never reach the network; re-entrant calls while a save is in flight
    /// are dropped (the button is disabled as well).
    pub fn guardar(&self, on_saved: Callback<EventoGuardado>) {
        if self.guardando.get_untracked() {
            return;
        }

        let sku = self.referencia.referencia_sku.trim().to_string();
        let linea = if !self.referencia.linea_texto.trim().is_empty() {
            self.referencia.linea_texto.trim().to_string()
        } else {
            self.referencia.linea.trim().to_string()
        };
        if let Err(mensaje) = model::validar_guardado(&sku, &linea) {
            self.error.set(Some(mensaje));
            return;
        }

        let solicitud = GuardarSegmentacionRequest {
            referencia_sku: sku.clone(),
            descripcion: self.referencia.descripcion.clone(),
            categoria: self.referencia.categoria.clone(),
            linea,
            tipo_portafolio: self.referencia.tipo_portafolio.clone(),
            precio_unitario: self.referencia.precio_unitario,
            estado_sku: self.referencia.estado_sku.clone(),
            cuento: self.referencia.cuento.clone(),
            codigo_barras: self.referencia.codigo_barras.clone(),
            tipo_inventario: self.referencia.tipo_inventario.clone(),
            detalle: self.estado.get_untracked().construir_detalle(),
        };

        self.guardando.set(true);
        let vm = self.clone();
        spawn_local(async move {
            match model::guardar(&solicitud).await {
                Ok(respuesta) => {
                    vm.guardando.set(false);
                    vm.error.set(None);
                    on_saved.run(EventoGuardado {
                        referencia_sku: sku,
                        respuesta,
                    });
                }
                Err(e) => {
                    vm.guardando.set(false);
                    vm.error.set(Some(e.to_string()));
                }
            }
        });
    }
}
