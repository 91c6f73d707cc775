//! Catalog listings straight from the GSE table.

use biograph::{GseRecord, SqliteQueryEngine};

use crate::config::{Error, RunConfig};

fn engine(config: &RunConfig) -> Result<SqliteQueryEngine, Error> {
    Ok(SqliteQueryEngine::from_url(&config.settings.database_url)?)
}

/// All GSE records, ordered by id.
pub async fn list_records(config: &RunConfig) -> Result<Vec<GseRecord>, Error> {
    Ok(engine(config)?.records().await?)
}

/// The record with `accession`, if any.
pub async fn find_record(config: &RunConfig, accession: &str) -> Result<Option<GseRecord>, Error> {
    Ok(engine(config)?.record(accession).await?)
}
