use std::collections::BTreeSet;

use contracts::domain::a002_segmentacion::aggregate::{
    DetalleSegmentacion, GuardarSegmentacionRequest, GuardarSegmentacionResponse,
    ResumenGuardado, SegmentacionGuardada, UltimaSegmentacion,
};

use super::repository;

/// User recorded on headers until real authentication lands in this service.
const DEFAULT_USER_ID: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ErrorGuardado {
    #[error("Falta referenciaSku para guardar.")]
    FaltaReferencia,
}

/// Keep only persistable rows: non-blank store key and size, units > 0.
/// Keys and sizes are trimmed on the way through.
pub fn depurar_detalle(detalle: &[DetalleSegmentacion]) -> Vec<DetalleSegmentacion> {
    detalle
        .iter()
        .filter_map(|fila| {
            let llave = fila.llave_naval.trim();
            let talla = fila.talla.trim();
            if llave.is_empty() || talla.is_empty() || fila.cantidad == 0 {
                return None;
            }
            Some(DetalleSegmentacion {
                llave_naval: llave.to_string(),
                talla: talla.to_string(),
                cantidad: fila.cantidad,
            })
        })
        .collect()
}

/// Save counters over the rows that were actually kept.
pub fn resumen_de(filas: &[DetalleSegmentacion], desactivadas: usize) -> ResumenGuardado {
    let mut tiendas: BTreeSet<&str> = BTreeSet::new();
    let mut tallas: BTreeSet<&str> = BTreeSet::new();
    let mut total: u64 = 0;
    for fila in filas {
        tiendas.insert(&fila.llave_naval);
        tallas.insert(&fila.talla);
        total += u64::from(fila.cantidad);
    }
    ResumenGuardado {
        tiendas_con_cantidad: tiendas.len(),
        total_unidades: total,
        tallas_usadas: tallas.into_iter().map(|t| t.to_string()).collect(),
        desactivadas,
        is_segmented: !filas.is_empty(),
    }
}

/// Persist one segmentation. An empty (depurated) detail list is a valid
/// save: the new header is written Inactiva and every previously active pair
/// becomes a deactivation row.
pub async fn guardar(
    solicitud: GuardarSegmentacionRequest,
) -> anyhow::Result<GuardarSegmentacionResponse> {
    if solicitud.referencia_sku.trim().is_empty() {
        return Err(ErrorGuardado::FaltaReferencia.into());
    }

    let filas = depurar_detalle(&solicitud.detalle);
    let ahora = chrono::Utc::now();

    let (id_segmentacion, desactivadas) =
        repository::guardar(&solicitud, &filas, ahora, DEFAULT_USER_ID).await?;

    tracing::info!(
        referencia = %solicitud.referencia_sku,
        id_segmentacion,
        tiendas = filas.iter().map(|f| f.llave_naval.as_str()).collect::<BTreeSet<_>>().len(),
        desactivadas,
        "segmentación guardada"
    );

    Ok(GuardarSegmentacionResponse {
        id_segmentacion,
        mensaje: "Segmentación guardada".to_string(),
        resumen: resumen_de(&filas, desactivadas),
    })
}

/// Latest saved segmentation for a SKU; `existe:false` when none.
pub async fn ultima(referencia_sku: &str) -> anyhow::Result<UltimaSegmentacion> {
    let referencia = referencia_sku.trim();
    if referencia.is_empty() {
        return Ok(UltimaSegmentacion {
            existe: false,
            segmentacion: None,
        });
    }

    let Some((cab, filas)) = repository::ultima(referencia).await? else {
        return Ok(UltimaSegmentacion {
            existe: false,
            segmentacion: None,
        });
    };

    let detalle = filas
        .into_iter()
        .map(|f| DetalleSegmentacion {
            llave_naval: f.llave_naval,
            talla: f.talla,
            cantidad: f.cantidad.max(0) as u32,
        })
        .collect();

    Ok(UltimaSegmentacion {
        existe: true,
        segmentacion: Some(SegmentacionGuardada {
            id_segmentacion: cab.id_segmentacion,
            referencia_sku: cab.referencia,
            descripcion: cab.descripcion,
            categoria: cab.categoria,
            linea: cab.linea,
            estado_segmentacion: cab.estado_segmentacion,
            fecha_creacion: Some(cab.fecha_creacion),
            detalle,
        }),
    })
}

/// CSV of every detail row joined with header and store metadata, ordered by
/// detail update time.
pub async fn export_csv() -> anyhow::Result<String> {
    let filas = repository::export_todas().await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "fecha_actualizacion",
        "id_segmentacion",
        "fecha_creacion",
        "id_usuario",
        "estado_segmentacion",
        "referenciaSku",
        "codigo_barras",
        "descripcion",
        "categoria",
        "linea",
        "tipo_portafolio",
        "estado_sku",
        "cuento",
        "tipo_inventario",
        "llave_naval",
        "talla",
        "cantidad",
        "estado_detalle",
        "cod_bodega",
        "cod_dependencia",
        "dependencia",
        "desc_dependencia",
        "ciudad",
        "zona",
        "clima",
        "rankin_linea",
        "testeo",
    ])?;

    for fila in filas {
        writer.write_record([
            fila.fecha_actualizacion.to_rfc3339(),
            fila.id_segmentacion.to_string(),
            fila.fecha_creacion.to_rfc3339(),
            fila.id_usuario.to_string(),
            fila.estado_segmentacion,
            fila.referencia,
            fila.codigo_barras,
            fila.descripcion,
            fila.categoria,
            fila.linea,
            fila.tipo_portafolio,
            fila.estado_sku,
            fila.cuento,
            fila.tipo_inventario,
            fila.llave_naval,
            fila.talla,
            fila.cantidad.to_string(),
            fila.estado_detalle,
            fila.cod_bodega.unwrap_or_default(),
            fila.cod_dependencia.unwrap_or_default(),
            fila.dependencia.unwrap_or_default(),
            fila.desc_dependencia.unwrap_or_default(),
            fila.ciudad.unwrap_or_default(),
            fila.zona.unwrap_or_default(),
            fila.clima.unwrap_or_default(),
            fila.rankin_linea.unwrap_or_default(),
            fila.testeo.unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fila(llave: &str, talla: &str, cantidad: u32) -> DetalleSegmentacion {
        DetalleSegmentacion {
            llave_naval: llave.into(),
            talla: talla.into(),
            cantidad,
        }
    }

    #[test]
    fn test_depurar_descarta_blancos_y_ceros() {
        let entrada = vec![
            fila("S1", "M", 5),
            fila("  ", "M", 3),
            fila("S2", "", 2),
            fila("S3", "L", 0),
            fila(" S4 ", " XL ", 1),
        ];
        let salida = depurar_detalle(&entrada);
        assert_eq!(salida, vec![fila("S1", "M", 5), fila("S4", "XL", 1)]);
    }

    #[test]
    fn test_resumen_cuenta_tiendas_unicas_y_ordena_tallas() {
        let filas = vec![fila("S1", "M", 5), fila("S1", "S", 2), fila("S2", "M", 1)];
        let resumen = resumen_de(&filas, 3);
        assert_eq!(resumen.tiendas_con_cantidad, 2);
        assert_eq!(resumen.total_unidades, 8);
        assert_eq!(resumen.tallas_usadas, vec!["M".to_string(), "S".to_string()]);
        assert_eq!(resumen.desactivadas, 3);
        assert!(resumen.is_segmented);
    }

    #[test]
    fn test_resumen_vacio_no_es_segmentado() {
        let resumen = resumen_de(&[], 4);
        assert_eq!(resumen.tiendas_con_cantidad, 0);
        assert_eq!(resumen.total_unidades, 0);
        assert!(!resumen.is_segmented);
    }
}
