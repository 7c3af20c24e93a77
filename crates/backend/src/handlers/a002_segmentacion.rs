use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use contracts::domain::a002_segmentacion::aggregate::{
    GuardarSegmentacionRequest, UltimaSegmentacion,
};
use contracts::shared::envelope::ApiEnvelope;

use crate::domain::a002_segmentacion;

#[derive(Debug, Deserialize, Default)]
pub struct UltimaQuery {
    #[serde(rename = "referenciaSku", default)]
    pub referencia_sku: String,
}

/// GET /api/segmentacion/segmentaciones/ultima
pub async fn ultima(Query(q): Query<UltimaQuery>) -> Response {
    if q.referencia_sku.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiEnvelope::<UltimaSegmentacion>::err(
                "Falta query param: referenciaSku",
            )),
        )
            .into_response();
    }

    match a002_segmentacion::service::ultima(&q.referencia_sku).await {
        Ok(data) => Json(ApiEnvelope::ok(data)).into_response(),
        Err(e) => {
            tracing::error!("consulta de última segmentación falló: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiEnvelope::<UltimaSegmentacion>::err(
                    "Error consultando la última segmentación",
                )),
            )
                .into_response()
        }
    }
}

/// POST /api/segmentacion/segmentaciones
///
/// The response is flat (`{ok, id_segmentacion, mensaje, resumen}`), matching
/// what the editor's save path expects.
pub async fn guardar(Json(solicitud): Json<GuardarSegmentacionRequest>) -> Response {
    match a002_segmentacion::service::guardar(solicitud).await {
        Ok(respuesta) => Json(json!({
            "ok": true,
            "id_segmentacion": respuesta.id_segmentacion,
            "mensaje": respuesta.mensaje,
            "resumen": respuesta.resumen,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("guardado de segmentación falló: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"ok": false, "error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// GET /api/segmentacion/export/csv
pub async fn export_csv() -> Response {
    match a002_segmentacion::service::export_csv().await {
        Ok(csv) => {
            // UTF-8 BOM so Excel opens accents correctly
            let mut cuerpo = vec![0xEF, 0xBB, 0xBF];
            cuerpo.extend_from_slice(csv.as_bytes());

            let filename = format!(
                "segmentaciones_todas_{}.csv",
                chrono::Utc::now().date_naive()
            );
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                cuerpo,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("export CSV falló: {e:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
