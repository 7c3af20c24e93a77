//! Owned editor state: per-store/per-size allocations, active flags and the
//! refetch sequence guard. Everything here is pure so it can be tested
//! without a browser; rendering and network I/O live in the view model.

use std::collections::{BTreeMap, BTreeSet};

use contracts::domain::a001_tienda::aggregate::Tienda;
use contracts::domain::a002_segmentacion::aggregate::DetalleSegmentacion;

// ============================================================================
// Load phases
// ============================================================================

/// Phase of the store grid: idle until the first load, then loading /
/// rendered / errored per refetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaseCarga {
    #[default]
    Inactiva,
    Cargando,
    Renderizada,
    Errada,
}

// ============================================================================
// Refetch sequence guard
// ============================================================================

/// Monotonic dispatch counter. Every refetch attempt takes a ticket at
/// dispatch time; a resolving fetch may only be applied while its ticket is
/// still the latest one, so a slow superseded request can never overwrite a
/// newer result.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardiaRecarga {
    ultimo: u64,
}

impl GuardiaRecarga {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the ticket for a new refetch attempt.
    pub fn despachar(&mut self) -> u64 {
        self.ultimo += 1;
        self.ultimo
    }

    pub fn es_vigente(&self, ticket: u64) -> bool {
        ticket == self.ultimo
    }
}

// ============================================================================
// Allocation state
// ============================================================================

/// In-memory allocation for one editor session: store key → size → units,
/// plus the set of active stores. Only active stores with units > 0 make it
/// into the save payload.
#[derive(Debug, Clone, Default)]
pub struct EstadoAsignacion {
    cantidades: BTreeMap<String, BTreeMap<String, u32>>,
    activas: BTreeSet<String>,
}

impl EstadoAsignacion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reiniciar(&mut self) {
        self.cantidades.clear();
        self.activas.clear();
    }

    pub fn esta_activa(&self, llave: &str) -> bool {
        self.activas.contains(llave)
    }

    pub fn cantidad(&self, llave: &str, talla: &str) -> u32 {
        self.cantidades
            .get(llave)
            .and_then(|tallas| tallas.get(talla))
            .copied()
            .unwrap_or(0)
    }

    /// Toggle one store. Deactivating with `limpiar_cantidades` zeroes every
    /// tracked size for that store.
    pub fn set_tienda_activa(&mut self, llave: &str, activa: bool, limpiar_cantidades: bool) {
        if activa {
            self.activas.insert(llave.to_string());
            return;
        }
        self.activas.remove(llave);
        if limpiar_cantidades {
            if let Some(tallas) = self.cantidades.get_mut(llave) {
                for cantidad in tallas.values_mut() {
                    *cantidad = 0;
                }
            }
        }
    }

    /// Apply [`set_tienda_activa`](Self::set_tienda_activa) to every loaded
    /// store.
    pub fn set_todas_activas<'a>(
        &mut self,
        llaves: impl IntoIterator<Item = &'a str>,
        activa: bool,
        limpiar_cantidades: bool,
    ) {
        for llave in llaves {
            self.set_tienda_activa(llave, activa, limpiar_cantidades);
        }
    }

    /// Copy the reference preset into every loaded store: full overwrite per
    /// size, not additive. A store only becomes active when its copied total
    /// is positive.
    pub fn aplicar_preset<'a>(
        &mut self,
        llaves: impl IntoIterator<Item = &'a str>,
        tallas: &[String],
        preset: &BTreeMap<String, u32>,
    ) {
        for llave in llaves {
            let mut total: u64 = 0;
            let fila = self.cantidades.entry(llave.to_string()).or_default();
            for talla in tallas {
                let cantidad = preset.get(talla).copied().unwrap_or(0);
                total += u64::from(cantidad);
                fila.insert(talla.clone(), cantidad);
            }
            if total > 0 {
                self.activas.insert(llave.to_string());
            }
        }
    }

    /// Set one cell. Rejected (no state change) while the store is inactive.
    pub fn set_cantidad(&mut self, llave: &str, talla: &str, cantidad: u32) -> bool {
        if !self.activas.contains(llave) {
            return false;
        }
        self.cantidades
            .entry(llave.to_string())
            .or_default()
            .insert(talla.to_string(), cantidad);
        true
    }

    /// Merge a previously saved detail list. Accepts store keys that are not
    /// in the currently loaded list (forward-compatible merge, not a join);
    /// any row with units > 0 marks its store active.
    pub fn fusionar_detalle(&mut self, detalle: &[DetalleSegmentacion]) {
        for fila in detalle {
            if fila.llave_naval.is_empty() || fila.talla.is_empty() {
                continue;
            }
            self.cantidades
                .entry(fila.llave_naval.clone())
                .or_default()
                .insert(fila.talla.clone(), fila.cantidad);
            if fila.cantidad > 0 {
                self.activas.insert(fila.llave_naval.clone());
            }
        }
    }

    /// Save payload rows: active stores, units > 0, ordered by store key and
    /// size.
    pub fn construir_detalle(&self) -> Vec<DetalleSegmentacion> {
        let mut detalle = Vec::new();
        for (llave, tallas) in &self.cantidades {
            if !self.activas.contains(llave) {
                continue;
            }
            for (talla, cantidad) in tallas {
                if *cantidad > 0 {
                    detalle.push(DetalleSegmentacion {
                        llave_naval: llave.clone(),
                        talla: talla.clone(),
                        cantidad: *cantidad,
                    });
                }
            }
        }
        detalle
    }

    pub fn tiendas_activas(&self) -> usize {
        self.activas.len()
    }

    /// Total units over active stores only.
    pub fn total_unidades(&self) -> u64 {
        self.cantidades
            .iter()
            .filter(|(llave, _)| self.activas.contains(llave.as_str()))
            .flat_map(|(_, tallas)| tallas.values())
            .map(|c| u64::from(*c))
            .sum()
    }
}

// ============================================================================
// Input coercion
// ============================================================================

/// Coerce raw input text to a non-negative integer. Signs, fractions,
/// garbage and out-of-range values all collapse to 0; a leading integer part
/// survives ("12abc" → 12, like the original form did).
pub fn coaccionar_cantidad(raw: &str) -> u32 {
    let texto = raw.trim();
    let texto = texto.strip_prefix('+').unwrap_or(texto);
    if texto.starts_with('-') {
        return 0;
    }
    let digitos: String = texto.chars().take_while(|c| c.is_ascii_digit()).collect();
    digitos.parse::<u32>().unwrap_or(0)
}

// ============================================================================
// Filter suggestions
// ============================================================================

/// Distinct values, sorted, deduplicated case-insensitively (first spelling
/// wins). Blank values are dropped.
pub fn valores_sugeridos<'a>(valores: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut vistos = BTreeSet::new();
    let mut salida: Vec<String> = Vec::new();
    for valor in valores {
        let valor = valor.trim();
        if valor.is_empty() {
            continue;
        }
        if vistos.insert(valor.to_lowercase()) {
            salida.push(valor.to_string());
        }
    }
    salida.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
    salida
}

/// Suggestion lists shown under the filter inputs, refreshed from every
/// successful store fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sugerencias {
    pub dependencias: Vec<String>,
    pub zonas: Vec<String>,
    pub climas: Vec<String>,
    pub testeos: Vec<String>,
    pub clasificaciones: Vec<String>,
}

impl Sugerencias {
    pub fn desde_tiendas(tiendas: &[Tienda]) -> Self {
        let campo = |f: fn(&Tienda) -> Option<&str>| {
            valores_sugeridos(tiendas.iter().filter_map(f))
        };
        Self {
            dependencias: campo(|t| t.desc_dependencia.as_deref().or(t.dependencia.as_deref())),
            zonas: campo(|t| t.zona.as_deref()),
            climas: campo(|t| t.clima.as_deref()),
            testeos: campo(|t| t.testeo_fnl.as_deref()),
            clasificaciones: campo(|t| t.rankin_linea.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detalle(llave: &str, talla: &str, cantidad: u32) -> DetalleSegmentacion {
        DetalleSegmentacion {
            llave_naval: llave.into(),
            talla: talla.into(),
            cantidad,
        }
    }

    #[test]
    fn test_coaccionar_cantidad() {
        assert_eq!(coaccionar_cantidad("5"), 5);
        assert_eq!(coaccionar_cantidad(" 12 "), 12);
        assert_eq!(coaccionar_cantidad("+7"), 7);
        assert_eq!(coaccionar_cantidad("12abc"), 12);
        assert_eq!(coaccionar_cantidad("3.7"), 3);
        assert_eq!(coaccionar_cantidad("-4"), 0);
        assert_eq!(coaccionar_cantidad("abc"), 0);
        assert_eq!(coaccionar_cantidad(""), 0);
        assert_eq!(coaccionar_cantidad("   "), 0);
        assert_eq!(coaccionar_cantidad("99999999999999999999"), 0);
    }

    #[test]
    fn test_set_cantidad_rechaza_tienda_inactiva() {
        let mut estado = EstadoAsignacion::new();
        assert!(!estado.set_cantidad("S1", "M", 5));
        assert_eq!(estado.cantidad("S1", "M"), 0);

        estado.set_tienda_activa("S1", true, false);
        assert!(estado.set_cantidad("S1", "M", 5));
        assert_eq!(estado.cantidad("S1", "M"), 5);
    }

    #[test]
    fn test_desactivar_con_limpieza_pone_todo_en_cero() {
        let mut estado = EstadoAsignacion::new();
        estado.set_tienda_activa("S1", true, false);
        estado.set_cantidad("S1", "S", 2);
        estado.set_cantidad("S1", "M", 3);

        estado.set_tienda_activa("S1", false, true);
        assert!(!estado.esta_activa("S1"));
        assert_eq!(estado.cantidad("S1", "S"), 0);
        assert_eq!(estado.cantidad("S1", "M"), 0);
    }

    #[test]
    fn test_desactivar_sin_limpieza_conserva_cantidades() {
        let mut estado = EstadoAsignacion::new();
        estado.set_tienda_activa("S1", true, false);
        estado.set_cantidad("S1", "M", 3);

        estado.set_tienda_activa("S1", false, false);
        assert_eq!(estado.cantidad("S1", "M"), 3);
        // but the payload no longer carries the row
        assert!(estado.construir_detalle().is_empty());
    }

    #[test]
    fn test_preset_no_activa_tiendas_con_total_cero() {
        let mut estado = EstadoAsignacion::new();
        let tallas = vec!["S".to_string(), "M".to_string()];
        let preset: BTreeMap<String, u32> =
            [("S".to_string(), 0), ("M".to_string(), 0)].into_iter().collect();

        estado.aplicar_preset(["S1"], &tallas, &preset);
        assert!(!estado.esta_activa("S1"));
        assert!(estado.construir_detalle().is_empty());
    }

    #[test]
    fn test_preset_sobrescribe_y_activa() {
        let mut estado = EstadoAsignacion::new();
        let tallas = vec!["S".to_string(), "M".to_string()];
        estado.set_tienda_activa("S1", true, false);
        estado.set_cantidad("S1", "S", 9);

        let preset: BTreeMap<String, u32> = [("M".to_string(), 4)].into_iter().collect();
        estado.aplicar_preset(["S1", "S2"], &tallas, &preset);

        // full overwrite per size: S drops to the preset's 0
        assert_eq!(estado.cantidad("S1", "S"), 0);
        assert_eq!(estado.cantidad("S1", "M"), 4);
        assert!(estado.esta_activa("S2"));
        assert_eq!(estado.cantidad("S2", "M"), 4);
    }

    #[test]
    fn test_payload_excluye_inactivas_y_ceros() {
        let mut estado = EstadoAsignacion::new();
        estado.set_tienda_activa("S1", true, false);
        estado.set_tienda_activa("S2", true, false);
        estado.set_cantidad("S1", "M", 5);
        estado.set_cantidad("S1", "L", 0);
        estado.set_cantidad("S2", "M", 7);
        estado.set_tienda_activa("S2", false, false);

        assert_eq!(estado.construir_detalle(), vec![detalle("S1", "M", 5)]);
    }

    #[test]
    fn test_fusion_y_payload_hacen_viaje_redondo() {
        let mut estado = EstadoAsignacion::new();
        estado.fusionar_detalle(&[detalle("S1", "M", 3)]);

        assert!(estado.esta_activa("S1"));
        assert_eq!(estado.construir_detalle(), vec![detalle("S1", "M", 3)]);
    }

    #[test]
    fn test_fusion_acepta_llaves_desconocidas_y_ceros_sin_activar() {
        let mut estado = EstadoAsignacion::new();
        estado.fusionar_detalle(&[detalle("FUERA-DE-LISTA", "S", 2), detalle("S9", "M", 0)]);

        assert!(estado.esta_activa("FUERA-DE-LISTA"));
        assert!(!estado.esta_activa("S9"));
    }

    #[test]
    fn test_resumen_cuenta_solo_activas() {
        let mut estado = EstadoAsignacion::new();
        estado.set_tienda_activa("S1", true, false);
        estado.set_tienda_activa("S2", true, false);
        estado.set_cantidad("S1", "M", 5);
        estado.set_cantidad("S2", "S", 2);
        estado.set_tienda_activa("S2", false, false);

        assert_eq!(estado.tiendas_activas(), 1);
        assert_eq!(estado.total_unidades(), 5);
    }

    #[test]
    fn test_guardia_descarta_respuestas_fuera_de_orden() {
        let mut guardia = GuardiaRecarga::new();
        let a = guardia.despachar();
        let b = guardia.despachar();

        // B resolves first and is applied; A resolves later and must not.
        assert!(guardia.es_vigente(b));
        assert!(!guardia.es_vigente(a));
    }

    #[test]
    fn test_valores_sugeridos_dedup_sin_mayusculas() {
        let valores = ["Norte", "  ", "norte", "Sur", "NORTE", "Centro"];
        assert_eq!(
            valores_sugeridos(valores.into_iter()),
            vec!["Centro".to_string(), "Norte".to_string(), "Sur".to_string()]
        );
    }

    #[test]
    fn test_sugerencias_desde_tiendas() {
        let tiendas = vec![
            Tienda {
                llave_naval: "S1".into(),
                desc_dependencia: Some("Tienda Centro".into()),
                zona: Some("Norte".into()),
                clima: Some("Frío".into()),
                rankin_linea: Some("AA".into()),
                ..Default::default()
            },
            Tienda {
                llave_naval: "S2".into(),
                dependencia: Some("BOD-02".into()),
                zona: Some("norte".into()),
                clima: Some("Calor".into()),
                rankin_linea: Some("B".into()),
                ..Default::default()
            },
        ];
        let s = Sugerencias::desde_tiendas(&tiendas);
        assert_eq!(s.dependencias, vec!["BOD-02".to_string(), "Tienda Centro".to_string()]);
        assert_eq!(s.zonas, vec!["Norte".to_string()]);
        assert_eq!(s.climas, vec!["Calor".to_string(), "Frío".to_string()]);
        assert_eq!(s.clasificaciones, vec!["AA".to_string(), "B".to_string()]);
        assert!(s.testeos.is_empty());
    }
}
