//! Network side of the editor: the three segmentation endpoints plus the
//! query-string builder for the store search.

use contracts::domain::a001_tienda::aggregate::Tienda;
use contracts::domain::a002_segmentacion::aggregate::{
    GuardarSegmentacionRequest, GuardarSegmentacionResponse, SegmentacionGuardada,
};
use contracts::shared::envelope::ApiEnvelope;
use serde_json::Value;

use crate::shared::api_utils::{api_url, get_json, post_json, FetchError};

use super::extract::extraer_lista;

/// Free-text filters of the store search. All optional; blank values are
/// omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filtros {
    pub dependencia: String,
    pub zona: String,
    pub clima: String,
    pub testeo: String,
    pub clasificacion: String,
}

/// Local save precondition: both identifiers must be present before any
/// network call is attempted.
pub fn validar_guardado(referencia_sku: &str, linea: &str) -> Result<(), String> {
    if referencia_sku.trim().is_empty() || linea.trim().is_empty() {
        return Err("La referencia no tiene SKU o línea; no se puede guardar.".to_string());
    }
    Ok(())
}

/// Query string for the active-stores endpoint: `linea` always, filters only
/// when non-blank after trimming.
pub fn construir_query_tiendas(linea: &str, filtros: &Filtros) -> String {
    let mut params = format!("linea={}", urlencoding::encode(linea.trim()));
    let campos = [
        ("dependencia", &filtros.dependencia),
        ("zona", &filtros.zona),
        ("clima", &filtros.clima),
        ("testeo", &filtros.testeo),
        ("clasificacion", &filtros.clasificacion),
    ];
    for (nombre, valor) in campos {
        let valor = valor.trim();
        if !valor.is_empty() {
            params += &format!("&{}={}", nombre, urlencoding::encode(valor));
        }
    }
    params
}

/// Active stores for a product line. `ok:false` and non-2xx both fail;
/// the row list is located inside the body via the extraction strategies.
pub async fn tiendas_activas(linea: &str, filtros: &Filtros) -> Result<Vec<Tienda>, FetchError> {
    let url = api_url(&format!(
        "/api/segmentacion/tiendas/activas?{}",
        construir_query_tiendas(linea, filtros)
    ));
    let envelope: ApiEnvelope<Value> = get_json(&url).await?;
    if !envelope.ok {
        return Err(FetchError::Protocol(
            envelope.error_text("No fue posible consultar las tiendas"),
        ));
    }
    let data = envelope.data.unwrap_or(Value::Null);
    let lista = extraer_lista(&data).unwrap_or_default();
    serde_json::from_value::<Vec<Tienda>>(Value::Array(lista))
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// Latest saved segmentation for a SKU. `ok:false` means "none exists" and
/// is not an error.
pub async fn ultima_segmentacion(
    referencia_sku: &str,
) -> Result<Option<SegmentacionGuardada>, FetchError> {
    let url = api_url(&format!(
        "/api/segmentacion/segmentaciones/ultima?referenciaSku={}",
        urlencoding::encode(referencia_sku.trim())
    ));
    let envelope: ApiEnvelope<Value> = get_json(&url).await?;
    if !envelope.ok {
        return Ok(None);
    }
    Ok(interpretar_ultima(&envelope.data.unwrap_or(Value::Null)))
}

/// The lookup has been seen with two nestings: the header under a
/// `segmentacion` key, or flattened with `detalle` at the top.
fn interpretar_ultima(data: &Value) -> Option<SegmentacionGuardada> {
    if let Some(segmentacion) = data.get("segmentacion") {
        if !segmentacion.is_null() {
            return serde_json::from_value(segmentacion.clone()).ok();
        }
    }
    if data.get("detalle").is_some() {
        return serde_json::from_value(data.clone()).ok();
    }
    None
}

/// Persist a segmentation. The response is the flat `{ok, id_segmentacion,
/// mensaje, resumen}` document of the save endpoint.
pub async fn guardar(
    solicitud: &GuardarSegmentacionRequest,
) -> Result<GuardarSegmentacionResponse, FetchError> {
    let url = api_url("/api/segmentacion/segmentaciones");
    let cuerpo: Value = post_json(&url, solicitud).await?;
    let ok = cuerpo.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
    if !ok {
        let mensaje = cuerpo
            .get("error")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("No fue posible guardar la segmentación");
        return Err(FetchError::Protocol(mensaje.to_string()));
    }
    serde_json::from_value(cuerpo).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validar_guardado_exige_sku_y_linea() {
        assert!(validar_guardado("103834-01 | 857", "Hombre Exterior").is_ok());
        assert!(validar_guardado("", "Hombre Exterior").is_err());
        assert!(validar_guardado("103834-01 | 857", "   ").is_err());
    }

    #[test]
    fn test_query_omite_campos_en_blanco() {
        let filtros = Filtros {
            zona: "   ".into(),
            clima: "Frío".into(),
            ..Default::default()
        };
        let query = construir_query_tiendas("12 - Hombre Exterior", &filtros);
        assert_eq!(query, "linea=12%20-%20Hombre%20Exterior&clima=Fr%C3%ADo");
    }

    #[test]
    fn test_query_solo_linea_cuando_no_hay_filtros() {
        let query = construir_query_tiendas("Bebito", &Filtros::default());
        assert_eq!(query, "linea=Bebito");
    }

    #[test]
    fn test_query_recorta_valores() {
        let filtros = Filtros {
            dependencia: "  Centro  ".into(),
            ..Default::default()
        };
        assert_eq!(
            construir_query_tiendas("Bebito", &filtros),
            "linea=Bebito&dependencia=Centro"
        );
    }

    #[test]
    fn test_interpretar_ultima_forma_anidada() {
        let data = json!({
            "existe": true,
            "segmentacion": {
                "id_segmentacion": 7,
                "referenciaSku": "103834-01 | 857",
                "detalle": [{"llave_naval": "S1", "talla": "M", "cantidad": 3}]
            }
        });
        let seg = interpretar_ultima(&data).unwrap();
        assert_eq!(seg.id_segmentacion, 7);
        assert_eq!(seg.detalle.len(), 1);
        assert_eq!(seg.detalle[0].cantidad, 3);
    }

    #[test]
    fn test_interpretar_ultima_forma_plana() {
        let data = json!({
            "id_segmentacion": 2,
            "referenciaSku": "X",
            "detalle": [{"llave_naval": "S1", "talla": "S", "cantidad": 1}]
        });
        let seg = interpretar_ultima(&data).unwrap();
        assert_eq!(seg.id_segmentacion, 2);
    }

    #[test]
    fn test_interpretar_ultima_sin_segmentacion() {
        assert!(interpretar_ultima(&json!({"existe": false, "segmentacion": null})).is_none());
        assert!(interpretar_ultima(&json!(null)).is_none());
    }
}
