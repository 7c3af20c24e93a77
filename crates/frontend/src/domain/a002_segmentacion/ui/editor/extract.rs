//! Locating the store list inside a variably-shaped response body.
//!
//! The stores endpoint has answered with several envelope shapes over time
//! (`data` as a bare array, `{tiendas: [...]}`, `{data: {rows: [...]}}`).
//! Instead of open-ended key guessing, extraction is an explicit, ordered
//! list of strategies tried in sequence; the first hit wins.

use serde_json::Value;

/// Container keys probed in order.
const CLAVES_CONTENEDORAS: [&str; 5] = ["data", "rows", "tiendas", "items", "result"];

/// How deep the container probe may nest.
const PROFUNDIDAD_MAX: usize = 3;

/// Find the row list inside `valor`, or `None` when no strategy matches.
pub fn extraer_lista(valor: &Value) -> Option<Vec<Value>> {
    estrategia_directa(valor).or_else(|| estrategia_contenedores(valor, PROFUNDIDAD_MAX))
}

/// Strategy 1: the payload already is the list.
fn estrategia_directa(valor: &Value) -> Option<Vec<Value>> {
    valor.as_array().cloned()
}

/// Strategy 2: probe known container keys, recursing into nested objects up
/// to `profundidad` levels.
fn estrategia_contenedores(valor: &Value, profundidad: usize) -> Option<Vec<Value>> {
    if profundidad == 0 {
        return None;
    }
    let objeto = valor.as_object()?;
    for clave in CLAVES_CONTENEDORAS {
        if let Some(hijo) = objeto.get(clave) {
            if let Some(lista) = estrategia_directa(hijo) {
                return Some(lista);
            }
            if let Some(lista) = estrategia_contenedores(hijo, profundidad - 1) {
                return Some(lista);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_directa() {
        let v = json!([{"llave_naval": "S1"}]);
        assert_eq!(extraer_lista(&v).unwrap().len(), 1);
    }

    #[test]
    fn test_contenedor_simple() {
        let v = json!({"tiendas": [{"llave_naval": "S1"}, {"llave_naval": "S2"}]});
        assert_eq!(extraer_lista(&v).unwrap().len(), 2);
    }

    #[test]
    fn test_contenedor_anidado() {
        let v = json!({"data": {"tiendas": [{"llave_naval": "S1"}]}});
        assert_eq!(extraer_lista(&v).unwrap().len(), 1);

        let v = json!({"result": {"rows": []}});
        assert_eq!(extraer_lista(&v).unwrap().len(), 0);
    }

    #[test]
    fn test_gana_la_primera_clave() {
        let v = json!({
            "data": [{"llave_naval": "A"}],
            "items": [{"llave_naval": "B"}]
        });
        let lista = extraer_lista(&v).unwrap();
        assert_eq!(lista[0]["llave_naval"], "A");
    }

    #[test]
    fn test_profundidad_acotada() {
        // four levels down: beyond PROFUNDIDAD_MAX, must give up
        let v = json!({"data": {"data": {"data": {"data": [1, 2]}}}});
        assert!(extraer_lista(&v).is_none());
    }

    #[test]
    fn test_sin_coincidencia() {
        assert!(extraer_lista(&json!({"otra": [1]})).is_none());
        assert!(extraer_lista(&json!("texto")).is_none());
        assert!(extraer_lista(&json!(null)).is_none());
    }
}
