use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Open-time descriptor
// ============================================================================

/// Product reference as handed to the segmentation editor by the reference
/// browser. Immutable for the lifetime of one editor session.
///
/// `linea` keeps the raw value from the source system ("12 - Hombre
/// Exterior"); `linea_texto` is the human label shown in the header and sent
/// on save. `tallas` fixes both the set and the on-screen order of the size
/// columns. `preset` is the optional suggested allocation copied into every
/// store by the preset action.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Referencia {
    #[serde(rename = "referenciaSku")]
    pub referencia_sku: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub categoria: String,
    #[serde(default)]
    pub estado_sku: String,
    #[serde(default)]
    pub tipo_portafolio: String,
    #[serde(default)]
    pub linea: String,
    #[serde(default)]
    pub linea_texto: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub cuento: String,
    #[serde(default)]
    pub codigo_barras: String,
    #[serde(default)]
    pub tipo_inventario: String,
    #[serde(default)]
    pub precio_unitario: f64,
    #[serde(default)]
    pub tallas: Vec<String>,
    #[serde(default)]
    pub preset: Option<BTreeMap<String, u32>>,
}

// ============================================================================
// Save request / response
// ============================================================================

/// One persisted allocation row: store key + size + units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetalleSegmentacion {
    pub llave_naval: String,
    pub talla: String,
    pub cantidad: u32,
}

/// POST body for saving a segmentation. Header fields are copied verbatim
/// from the descriptor; `detalle` holds only active stores with units > 0.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GuardarSegmentacionRequest {
    #[serde(rename = "referenciaSku")]
    pub referencia_sku: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub categoria: String,
    #[serde(default)]
    pub linea: String,
    #[serde(default)]
    pub tipo_portafolio: String,
    #[serde(default)]
    pub precio_unitario: f64,
    #[serde(default)]
    pub estado_sku: String,
    #[serde(default)]
    pub cuento: String,
    #[serde(default)]
    pub codigo_barras: String,
    #[serde(default)]
    pub tipo_inventario: String,
    #[serde(default)]
    pub detalle: Vec<DetalleSegmentacion>,
}

/// Aggregated counters returned by a successful save.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResumenGuardado {
    pub tiendas_con_cantidad: usize,
    pub total_unidades: u64,
    pub tallas_usadas: Vec<String>,
    pub desactivadas: usize,
    pub is_segmented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardarSegmentacionResponse {
    pub id_segmentacion: i32,
    pub mensaje: String,
    pub resumen: ResumenGuardado,
}

// ============================================================================
// Latest-segmentation lookup
// ============================================================================

/// Saved header plus its active detail rows, as returned by the
/// latest-segmentation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SegmentacionGuardada {
    pub id_segmentacion: i32,
    #[serde(rename = "referenciaSku")]
    pub referencia_sku: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub categoria: String,
    #[serde(default)]
    pub linea: String,
    #[serde(default)]
    pub estado_segmentacion: String,
    #[serde(default)]
    pub fecha_creacion: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub detalle: Vec<DetalleSegmentacion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UltimaSegmentacion {
    pub existe: bool,
    #[serde(default)]
    pub segmentacion: Option<SegmentacionGuardada>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_names() {
        let req = GuardarSegmentacionRequest {
            referencia_sku: "103834-01 | 857".into(),
            linea: "12 - Hombre Exterior".into(),
            detalle: vec![DetalleSegmentacion {
                llave_naval: "S1".into(),
                talla: "M".into(),
                cantidad: 5,
            }],
            ..Default::default()
        };
        let raw = serde_json::to_string(&req).unwrap();
        assert!(raw.contains("\"referenciaSku\""));
        assert!(raw.contains("\"llave_naval\":\"S1\""));
        assert!(raw.contains("\"cantidad\":5"));
    }

    #[test]
    fn test_ultima_without_segmentacion_deserializes() {
        let raw = r#"{"existe": false, "segmentacion": null}"#;
        let u: UltimaSegmentacion = serde_json::from_str(raw).unwrap();
        assert!(!u.existe);
        assert!(u.segmentacion.is_none());
    }
}
