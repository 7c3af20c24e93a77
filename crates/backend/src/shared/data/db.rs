use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Open the sqlite database (creating it if needed) and bootstrap the
/// schema. Must run once before any repository call.
pub async fn initialize_database(config: &crate::shared::config::Config) -> anyhow::Result<()> {
    let db_file = crate::shared::config::get_database_path(config)?;
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Normalize path separators and ensure a proper URL form on Windows
    let normalized = db_file.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    let conn = Database::connect(&db_url).await?;
    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("database already initialized"))?;

    tracing::info!("database ready at {}", db_file.display());
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("database not initialized; call initialize_database() first")
}

/// Minimal schema bootstrap: store master plus segmentation header/detail.
/// The `*_norm` columns hold the lowercase, trimmed values the active-stores
/// query filters on; ingestion (out of process) keeps them in sync.
async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let ddl = [
        r#"
        CREATE TABLE IF NOT EXISTS a001_tienda (
            llave_naval TEXT PRIMARY KEY NOT NULL,
            cod_bodega TEXT,
            cod_dependencia TEXT,
            dependencia TEXT,
            desc_dependencia TEXT,
            ciudad TEXT,
            zona TEXT,
            clima TEXT,
            linea TEXT,
            linea_norm TEXT NOT NULL DEFAULT '',
            estado_tienda TEXT,
            estado_linea TEXT,
            estado_tienda_norm TEXT NOT NULL DEFAULT '',
            estado_linea_norm TEXT NOT NULL DEFAULT '',
            testeo_fnl TEXT,
            rankin_linea TEXT,
            venta_promedio REAL,
            cpd REAL,
            indice_rotacion REAL
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_a001_tienda_linea
        ON a001_tienda (linea_norm, estado_tienda_norm, estado_linea_norm);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a002_segmentacion (
            id_segmentacion INTEGER PRIMARY KEY AUTOINCREMENT,
            id_usuario INTEGER NOT NULL DEFAULT 1,
            fecha_creacion TEXT NOT NULL,
            estado_segmentacion TEXT NOT NULL DEFAULT 'Activa',
            referencia TEXT NOT NULL,
            codigo_barras TEXT NOT NULL DEFAULT '',
            descripcion TEXT NOT NULL DEFAULT '',
            categoria TEXT NOT NULL DEFAULT '',
            linea TEXT NOT NULL DEFAULT '',
            tipo_portafolio TEXT NOT NULL DEFAULT '',
            precio_unitario REAL NOT NULL DEFAULT 0,
            estado_sku TEXT NOT NULL DEFAULT '',
            cuento TEXT NOT NULL DEFAULT '',
            tipo_inventario TEXT NOT NULL DEFAULT ''
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_a002_segmentacion_referencia
        ON a002_segmentacion (referencia, fecha_creacion);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a002_segmentacion_detalle (
            id_detalle INTEGER PRIMARY KEY AUTOINCREMENT,
            id_segmentacion INTEGER NOT NULL,
            llave_naval TEXT NOT NULL,
            talla TEXT NOT NULL,
            cantidad INTEGER NOT NULL DEFAULT 0,
            estado_detalle TEXT NOT NULL DEFAULT 'Activo',
            fecha_actualizacion TEXT NOT NULL
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_a002_detalle_segmentacion
        ON a002_segmentacion_detalle (id_segmentacion);
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_a002_detalle_fecha
        ON a002_segmentacion_detalle (fecha_actualizacion);
        "#,
    ];

    for statement in ddl {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            statement.to_string(),
        ))
        .await?;
    }
    Ok(())
}
