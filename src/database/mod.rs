//! Spatial-unit source backed by PostgreSQL/PostGIS.
mod source;

pub use source::*;

use crate::Failure;
use std::sync::Arc;
use tokio_postgres::Client;

/// Panorama metadata, one row per capture.
pub const PANOIDS: &str = "panoids";
/// Per-panorama municipality, grid cell codes and density.
pub const GEODATA: &str = "geodata";

/// Connect to PostgreSQL using `DB_URL` and quiet server notices.
pub async fn db() -> Result<Arc<Client>, Failure> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL")
        .map_err(|_| Failure::Config("DB_URL must be set".to_string()))?;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}
