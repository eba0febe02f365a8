use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection};

use crate::config::ProbabilityScale;
use crate::error::StoreError;
use crate::metrics::distribution::{DurationSample, DurationTable};

fn scale_name(scale: ProbabilityScale) -> &'static str {
    match scale {
        ProbabilityScale::Percent => "percent",
        ProbabilityScale::Fraction => "fraction",
    }
}

fn scale_from_name(name: &str) -> Result<ProbabilityScale, StoreError> {
    match name {
        "percent" => Ok(ProbabilityScale::Percent),
        "fraction" => Ok(ProbabilityScale::Fraction),
        other => Err(StoreError::UnknownScale(other.to_string())),
    }
}

/// Write duration tables to a fresh SQLite file, one row per push def.
pub fn save_tables(tables: &BTreeMap<String, DurationTable>, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    if path.exists() {
        std::fs::remove_file(path)?;
    }

    let mut conn = Connection::open(path)?;
    conn.execute(
        "CREATE TABLE duration_tables (
            push_def TEXT PRIMARY KEY, scale TEXT, n_samples INTEGER, samples BLOB
        )",
        [],
    )?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO duration_tables (push_def, scale, n_samples, samples) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (push_def, table) in tables {
            stmt.execute(params![
                push_def,
                scale_name(table.scale()),
                table.len() as i64,
                bincode::serialize(table.samples())?,
            ])?;
        }
    }
    tx.commit()?;

    tracing::info!(path = %path.display(), tables = tables.len(), "Saved duration tables");
    Ok(())
}

pub fn load_tables(path: impl AsRef<Path>) -> Result<BTreeMap<String, DurationTable>, StoreError> {
    let conn = Connection::open(path)?;
    let mut stmt = conn.prepare("SELECT push_def, scale, samples FROM duration_tables")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Vec<u8>>(2)?,
        ))
    })?;

    let mut tables = BTreeMap::new();
    for row in rows {
        let (push_def, scale, blob) = row?;
        let samples: Vec<DurationSample> = bincode::deserialize(&blob)?;
        let table = DurationTable::from_samples(samples, scale_from_name(&scale)?)?;
        tables.insert(push_def, table);
    }
    Ok(tables)
}
