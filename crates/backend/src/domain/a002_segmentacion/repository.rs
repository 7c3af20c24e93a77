use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use contracts::domain::a002_segmentacion::aggregate::{
    DetalleSegmentacion, GuardarSegmentacionRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseBackend, EntityTrait,
    FromQueryResult, Order, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};

use crate::shared::data::db::get_connection;

pub mod cabecera {
    use sea_orm::entity::prelude::*;

    /// Segmentation header. Every save writes a fresh row; history is kept
    /// by flipping the previous Active header to Inactiva.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "a002_segmentacion")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id_segmentacion: i32,
        pub id_usuario: i32,
        pub fecha_creacion: DateTimeUtc,
        pub estado_segmentacion: String,
        pub referencia: String,
        pub codigo_barras: String,
        pub descripcion: String,
        pub categoria: String,
        pub linea: String,
        pub tipo_portafolio: String,
        pub precio_unitario: f64,
        pub estado_sku: String,
        pub cuento: String,
        pub tipo_inventario: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod detalle {
    use sea_orm::entity::prelude::*;

    /// One allocation row under a header. Deactivations are recorded as
    /// zero-quantity Inactivo rows so they show up in the export.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "a002_segmentacion_detalle")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id_detalle: i32,
        pub id_segmentacion: i32,
        pub llave_naval: String,
        pub talla: String,
        pub cantidad: i32,
        pub estado_detalle: String,
        pub fecha_actualizacion: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Newest header for a SKU (any state) plus its active detail rows.
pub async fn ultima(
    referencia: &str,
) -> anyhow::Result<Option<(cabecera::Model, Vec<detalle::Model>)>> {
    let Some(cab) = cabecera::Entity::find()
        .filter(cabecera::Column::Referencia.eq(referencia))
        .order_by_desc(cabecera::Column::FechaCreacion)
        .one(conn())
        .await?
    else {
        return Ok(None);
    };

    let filas = detalle::Entity::find()
        .filter(detalle::Column::IdSegmentacion.eq(cab.id_segmentacion))
        .filter(detalle::Column::EstadoDetalle.eq("Activo"))
        .all(conn())
        .await?;

    Ok(Some((cab, filas)))
}

/// Persist one save in a single transaction:
/// previous Active header → Inactiva, new header inserted (Activa only when
/// the new detail set is non-empty), active rows inserted, and a
/// zero-quantity Inactivo row for every previously-active (store, size) pair
/// missing from the new set. Returns the new header id and how many pairs
/// were deactivated.
pub async fn guardar(
    solicitud: &GuardarSegmentacionRequest,
    filas: &[DetalleSegmentacion],
    ahora: DateTime<Utc>,
    id_usuario: i32,
) -> anyhow::Result<(i32, usize)> {
    let referencia = solicitud.referencia_sku.trim().to_string();
    let txn = conn().begin().await?;

    let previa = cabecera::Entity::find()
        .filter(cabecera::Column::Referencia.eq(referencia.clone()))
        .filter(cabecera::Column::EstadoSegmentacion.eq("Activa"))
        .order_by(cabecera::Column::FechaCreacion, Order::Desc)
        .one(&txn)
        .await?;

    let mut llaves_previas: BTreeSet<(String, String)> = BTreeSet::new();
    if let Some(prev) = &previa {
        let previas = detalle::Entity::find()
            .filter(detalle::Column::IdSegmentacion.eq(prev.id_segmentacion))
            .filter(detalle::Column::EstadoDetalle.eq("Activo"))
            .filter(detalle::Column::Cantidad.gt(0))
            .all(&txn)
            .await?;
        llaves_previas = previas
            .into_iter()
            .map(|f| (f.llave_naval, f.talla))
            .collect();
    }

    let llaves_nuevas: BTreeSet<(String, String)> = filas
        .iter()
        .map(|f| (f.llave_naval.clone(), f.talla.clone()))
        .collect();
    let desactivadas: Vec<(String, String)> = llaves_previas
        .difference(&llaves_nuevas)
        .cloned()
        .collect();
    let nueva_activa = !llaves_nuevas.is_empty();

    if let Some(prev) = previa {
        let mut activa: cabecera::ActiveModel = prev.into();
        activa.estado_segmentacion = Set("Inactiva".to_string());
        activa.update(&txn).await?;
    }

    let insertada = cabecera::ActiveModel {
        id_usuario: Set(id_usuario),
        fecha_creacion: Set(ahora),
        estado_segmentacion: Set(if nueva_activa { "Activa" } else { "Inactiva" }.to_string()),
        referencia: Set(referencia),
        codigo_barras: Set(solicitud.codigo_barras.trim().to_string()),
        descripcion: Set(solicitud.descripcion.trim().to_string()),
        categoria: Set(solicitud.categoria.trim().to_string()),
        linea: Set(solicitud.linea.trim().to_string()),
        tipo_portafolio: Set(solicitud.tipo_portafolio.trim().to_string()),
        precio_unitario: Set(solicitud.precio_unitario),
        estado_sku: Set(solicitud.estado_sku.trim().to_string()),
        cuento: Set(solicitud.cuento.trim().to_string()),
        tipo_inventario: Set(solicitud.tipo_inventario.trim().to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    let id_segmentacion = insertada.id_segmentacion;

    let mut inserciones: Vec<detalle::ActiveModel> = Vec::new();
    for fila in filas {
        inserciones.push(detalle::ActiveModel {
            id_segmentacion: Set(id_segmentacion),
            llave_naval: Set(fila.llave_naval.clone()),
            talla: Set(fila.talla.clone()),
            cantidad: Set(fila.cantidad as i32),
            estado_detalle: Set("Activo".to_string()),
            fecha_actualizacion: Set(ahora),
            ..Default::default()
        });
    }
    for (llave, talla) in &desactivadas {
        inserciones.push(detalle::ActiveModel {
            id_segmentacion: Set(id_segmentacion),
            llave_naval: Set(llave.clone()),
            talla: Set(talla.clone()),
            cantidad: Set(0),
            estado_detalle: Set("Inactivo".to_string()),
            fecha_actualizacion: Set(ahora),
            ..Default::default()
        });
    }
    if !inserciones.is_empty() {
        detalle::Entity::insert_many(inserciones).exec(&txn).await?;
    }

    txn.commit().await?;
    Ok((id_segmentacion, desactivadas.len()))
}

/// Flat export row: detail joined with its header and the store master.
#[derive(Debug, Clone, FromQueryResult)]
pub struct FilaExport {
    pub fecha_actualizacion: chrono::DateTime<Utc>,
    pub id_segmentacion: i32,
    pub fecha_creacion: chrono::DateTime<Utc>,
    pub id_usuario: i32,
    pub estado_segmentacion: String,
    pub referencia: String,
    pub codigo_barras: String,
    pub descripcion: String,
    pub categoria: String,
    pub linea: String,
    pub tipo_portafolio: String,
    pub estado_sku: String,
    pub cuento: String,
    pub tipo_inventario: String,
    pub llave_naval: String,
    pub talla: String,
    pub cantidad: i32,
    pub estado_detalle: String,
    pub cod_bodega: Option<String>,
    pub cod_dependencia: Option<String>,
    pub dependencia: Option<String>,
    pub desc_dependencia: Option<String>,
    pub ciudad: Option<String>,
    pub zona: Option<String>,
    pub clima: Option<String>,
    pub rankin_linea: Option<String>,
    pub testeo: Option<String>,
}

pub async fn export_todas() -> anyhow::Result<Vec<FilaExport>> {
    let sql = r#"
        SELECT
            d.fecha_actualizacion,
            s.id_segmentacion,
            s.fecha_creacion,
            s.id_usuario,
            s.estado_segmentacion,
            s.referencia,
            s.codigo_barras,
            s.descripcion,
            s.categoria,
            s.linea,
            s.tipo_portafolio,
            s.estado_sku,
            s.cuento,
            s.tipo_inventario,
            d.llave_naval,
            d.talla,
            d.cantidad,
            d.estado_detalle,
            t.cod_bodega,
            t.cod_dependencia,
            t.dependencia,
            t.desc_dependencia,
            t.ciudad,
            t.zona,
            t.clima,
            t.rankin_linea,
            t.testeo_fnl AS testeo
        FROM a002_segmentacion_detalle d
        JOIN a002_segmentacion s
          ON s.id_segmentacion = d.id_segmentacion
        LEFT JOIN a001_tienda t
          ON t.llave_naval = d.llave_naval
        ORDER BY d.fecha_actualizacion ASC, s.id_segmentacion ASC;
    "#;

    let filas = FilaExport::find_by_statement(Statement::from_string(
        DatabaseBackend::Sqlite,
        sql.to_string(),
    ))
    .all(conn())
    .await?;
    Ok(filas)
}
