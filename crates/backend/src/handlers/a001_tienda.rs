use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use contracts::domain::a001_tienda::aggregate::TiendasActivas;
use contracts::shared::envelope::ApiEnvelope;

use crate::domain::a001_tienda::{self, service::FiltrosTiendas};

#[derive(Debug, Deserialize, Default)]
pub struct TiendasActivasQuery {
    #[serde(default)]
    pub linea: String,
    #[serde(default)]
    pub dependencia: String,
    #[serde(default)]
    pub zona: String,
    #[serde(default)]
    pub ciudad: String,
    #[serde(default)]
    pub clima: String,
    #[serde(default)]
    pub testeo: String,
    #[serde(default)]
    pub clasificacion: String,
}

/// GET /api/segmentacion/tiendas/activas
pub async fn tiendas_activas(Query(q): Query<TiendasActivasQuery>) -> Response {
    if q.linea.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiEnvelope::<TiendasActivas>::err("Falta query param: linea")),
        )
            .into_response();
    }

    let filtros = FiltrosTiendas {
        dependencia: q.dependencia,
        zona: q.zona,
        ciudad: q.ciudad,
        clima: q.clima,
        testeo: q.testeo,
        clasificacion: q.clasificacion,
    };

    match a001_tienda::service::tiendas_activas(&q.linea, &filtros).await {
        Ok(data) => Json(ApiEnvelope::ok(data)).into_response(),
        Err(e) => {
            tracing::error!("consulta de tiendas activas falló: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiEnvelope::<TiendasActivas>::err(
                    "Error consultando tiendas activas",
                )),
            )
                .into_response()
        }
    }
}

/// POST /api/segmentacion/tiendas/testdata
pub async fn insert_test_data() -> StatusCode {
    match a001_tienda::service::insert_test_data().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("siembra de tiendas falló: {e:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
