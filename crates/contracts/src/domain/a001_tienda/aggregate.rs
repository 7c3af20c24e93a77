use serde::{Deserialize, Serialize};

// ============================================================================
// Aggregate
// ============================================================================

/// Retail store (point of sale) as exposed by the active-stores query.
///
/// `llave_naval` is the stable unique store key every other table joins on.
/// Metric fields come from the rolling-window sales views and may be absent
/// for stores that opened recently.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tienda {
    pub llave_naval: String,

    #[serde(default)]
    pub cod_bodega: Option<String>,
    #[serde(default)]
    pub cod_dependencia: Option<String>,
    #[serde(default)]
    pub dependencia: Option<String>,
    #[serde(default)]
    pub desc_dependencia: Option<String>,

    #[serde(default)]
    pub ciudad: Option<String>,
    #[serde(default)]
    pub zona: Option<String>,
    #[serde(default)]
    pub clima: Option<String>,

    #[serde(default)]
    pub linea: Option<String>,
    #[serde(default)]
    pub estado_linea: Option<String>,
    #[serde(default)]
    pub estado_tienda: Option<String>,

    #[serde(default)]
    pub testeo_fnl: Option<String>,
    #[serde(default)]
    pub rankin_linea: Option<String>,

    #[serde(default)]
    pub venta_promedio: Option<f64>,
    #[serde(default)]
    pub cpd: Option<f64>,
    #[serde(default)]
    pub indice_rotacion: Option<f64>,
}

impl Tienda {
    /// Display name: long description when present, dependency name otherwise.
    pub fn nombre(&self) -> &str {
        self.desc_dependencia
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.dependencia.as_deref())
            .unwrap_or(&self.llave_naval)
    }

    pub fn perfil(&self) -> PerfilTienda {
        PerfilTienda::from_rankin(self.rankin_linea.as_deref().unwrap_or(""))
    }
}

// ============================================================================
// Ranking tiers
// ============================================================================

/// Profile tier derived from the per-line ranking code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerfilTienda {
    Alta,
    Media,
    Baja,
}

impl PerfilTienda {
    /// AA/A rank as top tier, B as middle; C, NA and anything unknown or
    /// empty fall to the bottom tier.
    pub fn from_rankin(rankin: &str) -> Self {
        match rankin.trim().to_uppercase().as_str() {
            "AA" | "A" => PerfilTienda::Alta,
            "B" => PerfilTienda::Media,
            _ => PerfilTienda::Baja,
        }
    }

    pub fn etiqueta(&self) -> &'static str {
        match self {
            PerfilTienda::Alta => "Perfil alto",
            PerfilTienda::Media => "Perfil medio",
            PerfilTienda::Baja => "Perfil bajo",
        }
    }
}

// ============================================================================
// Query payload
// ============================================================================

/// Filters echoed back by the active-stores endpoint (`None` = not applied).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FiltrosAplicados {
    pub dependencia: Option<String>,
    pub zona: Option<String>,
    pub ciudad: Option<String>,
    pub clima: Option<String>,
    pub testeo: Option<String>,
    pub clasificacion: Option<String>,
}

/// `data` payload of the active-stores endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TiendasActivas {
    pub linea: String,
    pub filtros_aplicados: FiltrosAplicados,
    pub tiendas: Vec<Tienda>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rankin_tiers() {
        assert_eq!(PerfilTienda::from_rankin("AA"), PerfilTienda::Alta);
        assert_eq!(PerfilTienda::from_rankin("A"), PerfilTienda::Alta);
        assert_eq!(PerfilTienda::from_rankin(" a "), PerfilTienda::Alta);
        assert_eq!(PerfilTienda::from_rankin("B"), PerfilTienda::Media);
        assert_eq!(PerfilTienda::from_rankin("C"), PerfilTienda::Baja);
        assert_eq!(PerfilTienda::from_rankin("NA"), PerfilTienda::Baja);
        assert_eq!(PerfilTienda::from_rankin(""), PerfilTienda::Baja);
        assert_eq!(PerfilTienda::from_rankin("???"), PerfilTienda::Baja);
    }

    #[test]
    fn test_nombre_prefers_desc_dependencia() {
        let t = Tienda {
            llave_naval: "T001".into(),
            dependencia: Some("BOD-01".into()),
            desc_dependencia: Some("Tienda Centro".into()),
            ..Default::default()
        };
        assert_eq!(t.nombre(), "Tienda Centro");
    }

    #[test]
    fn test_nombre_falls_back_to_dependencia_then_llave() {
        let t = Tienda {
            llave_naval: "T002".into(),
            dependencia: Some("BOD-02".into()),
            desc_dependencia: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(t.nombre(), "BOD-02");

        let t = Tienda {
            llave_naval: "T003".into(),
            ..Default::default()
        };
        assert_eq!(t.nombre(), "T003");
    }
}
