use contracts::domain::a001_tienda::aggregate::{FiltrosAplicados, TiendasActivas};
use sea_orm::Set;

use super::repository::{self, Clasificacion, ConsultaTiendas};

/// Ranking codes that force an exact comparison instead of a partial match.
const CLASIFICACIONES_EXACTAS: [&str; 5] = ["AA", "A", "B", "C", "NA"];

/// Raw filter values as received from the query string.
#[derive(Debug, Clone, Default)]
pub struct FiltrosTiendas {
    pub dependencia: String,
    pub zona: String,
    pub ciudad: String,
    pub clima: String,
    pub testeo: String,
    pub clasificacion: String,
}

/// Line normalization used everywhere a raw line value meets the store
/// master: `"17 - Bebito"` → `"bebito"`, `"Bebito"` → `"bebito"`.
pub fn normalizar_linea(linea_raw: &str) -> String {
    let valor = linea_raw.trim();
    let valor = match valor.split_once(" - ") {
        Some((_, resto)) => resto,
        None => valor,
    };
    valor.trim().to_lowercase()
}

/// Decide whether a classification filter compares exactly (AA/A/B/C/NA,
/// case- and space-insensitive, `N/A` counts as `NA`) or partially.
pub fn clasificacion_filtro(valor: &str) -> Clasificacion {
    let valor = valor.trim();
    if valor.is_empty() {
        return Clasificacion::Ninguna;
    }
    let mut codigo = valor.to_uppercase().replace(' ', "");
    if codigo == "N/A" {
        codigo = "NA".to_string();
    }
    if CLASIFICACIONES_EXACTAS.contains(&codigo.as_str()) {
        Clasificacion::Exacta(codigo)
    } else {
        Clasificacion::Parcial(valor.to_string())
    }
}

fn aplicado(valor: &str) -> Option<String> {
    let valor = valor.trim();
    if valor.is_empty() {
        None
    } else {
        Some(valor.to_string())
    }
}

/// Active stores for a raw line value plus optional filters.
pub async fn tiendas_activas(
    linea_raw: &str,
    filtros: &FiltrosTiendas,
) -> anyhow::Result<TiendasActivas> {
    let linea_norm = normalizar_linea(linea_raw);

    let consulta = ConsultaTiendas {
        linea_norm: linea_norm.clone(),
        dependencia: filtros.dependencia.trim().to_string(),
        zona: filtros.zona.trim().to_string(),
        ciudad: filtros.ciudad.trim().to_string(),
        clima: filtros.clima.trim().to_string(),
        testeo: filtros.testeo.trim().to_string(),
        clasificacion: Some(clasificacion_filtro(&filtros.clasificacion)),
    };

    let tiendas = repository::tiendas_activas(&consulta).await?;

    Ok(TiendasActivas {
        linea: linea_norm,
        filtros_aplicados: FiltrosAplicados {
            dependencia: aplicado(&filtros.dependencia),
            zona: aplicado(&filtros.zona),
            ciudad: aplicado(&filtros.ciudad),
            clima: aplicado(&filtros.clima),
            testeo: aplicado(&filtros.testeo),
            clasificacion: aplicado(&filtros.clasificacion),
        },
        tiendas,
    })
}

/// Seed a deterministic store master for demos and end-to-end checks.
pub async fn insert_test_data() -> anyhow::Result<()> {
    let filas = vec![
        semilla("T001", "BOD-01", "Tienda Centro", "Bogotá", "Centro", "Frío", "12 - Hombre Exterior", "", "AA", 182.5, 6.1, 1.4),
        semilla("T002", "BOD-02", "Tienda Norte", "Bogotá", "Norte", "Frío", "12 - Hombre Exterior", "Testeo", "A", 140.0, 4.6, 1.1),
        semilla("T003", "BOD-03", "Tienda Cali Sur", "Cali", "Sur", "Calor", "12 - Hombre Exterior", "", "B", 96.3, 3.2, 0.8),
        semilla("T004", "BOD-04", "Tienda Medellín", "Medellín", "Occidente", "Templado", "12 - Hombre Exterior", "", "C", 51.0, 1.7, 0.5),
        semilla("T005", "BOD-05", "Tienda Costa", "Barranquilla", "Caribe", "Calor", "12 - Hombre Exterior", "", "NA", 34.9, 1.2, 0.3),
        semilla("T006", "BOD-06", "Tienda Chapinero", "Bogotá", "Centro", "Frío", "17 - Bebito", "", "A", 77.8, 2.5, 0.9),
        semilla("T007", "BOD-07", "Tienda Envigado", "Medellín", "Sur", "Templado", "17 - Bebito", "Testeo", "B", 42.1, 1.4, 0.6),
    ];
    let total = repository::reemplazar_todas(filas).await?;
    tracing::info!("maestra de tiendas sembrada con {} filas", total);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn semilla(
    llave: &str,
    dependencia: &str,
    desc: &str,
    ciudad: &str,
    zona: &str,
    clima: &str,
    linea_raw: &str,
    testeo: &str,
    rankin: &str,
    venta_promedio: f64,
    cpd: f64,
    indice_rotacion: f64,
) -> super::repository::ActiveModel {
    super::repository::ActiveModel {
        llave_naval: Set(llave.to_string()),
        cod_bodega: Set(Some(format!("CB-{llave}"))),
        cod_dependencia: Set(Some(dependencia.to_string())),
        dependencia: Set(Some(dependencia.to_string())),
        desc_dependencia: Set(Some(desc.to_string())),
        ciudad: Set(Some(ciudad.to_string())),
        zona: Set(Some(zona.to_string())),
        clima: Set(Some(clima.to_string())),
        linea: Set(Some(linea_raw.to_string())),
        linea_norm: Set(normalizar_linea(linea_raw)),
        estado_tienda: Set(Some("Activo".to_string())),
        estado_linea: Set(Some("Activo".to_string())),
        estado_tienda_norm: Set("activo".to_string()),
        estado_linea_norm: Set("activo".to_string()),
        testeo_fnl: Set(if testeo.is_empty() { None } else { Some(testeo.to_string()) }),
        rankin_linea: Set(Some(rankin.to_string())),
        venta_promedio: Set(Some(venta_promedio)),
        cpd: Set(Some(cpd)),
        indice_rotacion: Set(Some(indice_rotacion)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizar_linea() {
        assert_eq!(normalizar_linea("17 - Bebito"), "bebito");
        assert_eq!(normalizar_linea("Bebito"), "bebito");
        assert_eq!(normalizar_linea("  12 - Hombre Exterior  "), "hombre exterior");
        assert_eq!(normalizar_linea(""), "");
    }

    #[test]
    fn test_clasificacion_exacta() {
        assert_eq!(clasificacion_filtro(" aa "), Clasificacion::Exacta("AA".into()));
        assert_eq!(clasificacion_filtro("n/a"), Clasificacion::Exacta("NA".into()));
        assert_eq!(clasificacion_filtro("b"), Clasificacion::Exacta("B".into()));
    }

    #[test]
    fn test_clasificacion_parcial_y_vacia() {
        assert_eq!(clasificacion_filtro(""), Clasificacion::Ninguna);
        assert_eq!(clasificacion_filtro("   "), Clasificacion::Ninguna);
        assert_eq!(
            clasificacion_filtro("buena"),
            Clasificacion::Parcial("buena".into())
        );
    }

    #[test]
    fn test_filtros_aplicados_omite_blancos() {
        assert_eq!(aplicado("  "), None);
        assert_eq!(aplicado(" Norte "), Some("Norte".to_string()));
    }
}
