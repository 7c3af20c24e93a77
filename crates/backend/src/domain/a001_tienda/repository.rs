use contracts::domain::a001_tienda::aggregate::Tienda;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_tienda")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub llave_naval: String,
    pub cod_bodega: Option<String>,
    pub cod_dependencia: Option<String>,
    pub dependencia: Option<String>,
    pub desc_dependencia: Option<String>,
    pub ciudad: Option<String>,
    pub zona: Option<String>,
    pub clima: Option<String>,
    pub linea: Option<String>,
    pub linea_norm: String,
    pub estado_tienda: Option<String>,
    pub estado_linea: Option<String>,
    pub estado_tienda_norm: String,
    pub estado_linea_norm: String,
    pub testeo_fnl: Option<String>,
    pub rankin_linea: Option<String>,
    pub venta_promedio: Option<f64>,
    pub cpd: Option<f64>,
    pub indice_rotacion: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Tienda {
    fn from(m: Model) -> Self {
        Tienda {
            llave_naval: m.llave_naval,
            cod_bodega: m.cod_bodega,
            cod_dependencia: m.cod_dependencia,
            dependencia: m.dependencia,
            desc_dependencia: m.desc_dependencia,
            ciudad: m.ciudad,
            zona: m.zona,
            clima: m.clima,
            linea: m.linea,
            estado_linea: m.estado_linea,
            estado_tienda: m.estado_tienda,
            testeo_fnl: m.testeo_fnl,
            rankin_linea: m.rankin_linea,
            venta_promedio: m.venta_promedio,
            cpd: m.cpd,
            indice_rotacion: m.indice_rotacion,
        }
    }
}

/// Classification filter: codes from the fixed set compare exactly against
/// the uppercased ranking, anything else is a partial match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clasificacion {
    Ninguna,
    Exacta(String),
    Parcial(String),
}

/// Normalized query parameters for the active-stores search. The service
/// layer trims and normalizes; this layer only translates to SQL.
#[derive(Debug, Clone, Default)]
pub struct ConsultaTiendas {
    pub linea_norm: String,
    pub dependencia: String,
    pub zona: String,
    pub ciudad: String,
    pub clima: String,
    pub testeo: String,
    pub clasificacion: Option<Clasificacion>,
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn tiendas_activas(consulta: &ConsultaTiendas) -> anyhow::Result<Vec<Tienda>> {
    let mut query = Entity::find()
        .filter(Column::LineaNorm.eq(consulta.linea_norm.clone()))
        .filter(Column::EstadoTiendaNorm.eq("activo"))
        .filter(Column::EstadoLineaNorm.eq("activo"));

    if !consulta.dependencia.is_empty() {
        query = query.filter(
            Condition::any()
                .add(Column::Dependencia.contains(&consulta.dependencia))
                .add(Column::DescDependencia.contains(&consulta.dependencia)),
        );
    }
    if !consulta.zona.is_empty() {
        query = query.filter(Column::Zona.contains(&consulta.zona));
    }
    if !consulta.ciudad.is_empty() {
        query = query.filter(Column::Ciudad.contains(&consulta.ciudad));
    }
    if !consulta.clima.is_empty() {
        query = query.filter(Column::Clima.contains(&consulta.clima));
    }
    if !consulta.testeo.is_empty() {
        query = query.filter(Column::TesteoFnl.contains(&consulta.testeo));
    }

    match &consulta.clasificacion {
        None | Some(Clasificacion::Ninguna) => {}
        Some(Clasificacion::Exacta(codigo)) => {
            query = query.filter(Expr::cust_with_values(
                "UPPER(COALESCE(rankin_linea, '')) = ?",
                [codigo.clone()],
            ));
        }
        Some(Clasificacion::Parcial(texto)) => {
            query = query.filter(Column::RankinLinea.contains(texto));
        }
    }

    let modelos = query
        .order_by(Expr::cust("COALESCE(desc_dependencia, dependencia)"), Order::Asc)
        .all(conn())
        .await?;

    Ok(modelos.into_iter().map(Into::into).collect())
}

/// Replace the whole store master (seed/demo path).
pub async fn reemplazar_todas(filas: Vec<ActiveModel>) -> anyhow::Result<usize> {
    let total = filas.len();
    Entity::delete_many().exec(conn()).await?;
    if !filas.is_empty() {
        Entity::insert_many(filas).exec(conn()).await?;
    }
    Ok(total)
}
