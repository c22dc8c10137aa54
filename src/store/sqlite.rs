use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory store, mostly useful in tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn row_to_manifest(row: &Row<'_>) -> rusqlite::Result<Manifest> {
    Ok(Manifest {
        id: row.get(0)?,
        name: row.get(1)?,
        project_code: row.get(2)?,
    })
}

fn row_to_attribute(row: &Row<'_>) -> rusqlite::Result<Attribute> {
    let type_str: String = row.get(3)?;
    let attribute_type = AttributeType::parse(&type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown attribute type '{type_str}'").into(),
        )
    })?;

    Ok(Attribute {
        id: row.get(0)?,
        manifest_id: row.get(1)?,
        name: row.get(2)?,
        attribute_type,
        value: row.get(4)?,
        project_code: row.get(5)?,
        optional: row.get(6)?,
    })
}

fn row_to_dataset_version(row: &Row<'_>) -> rusqlite::Result<DatasetVersion> {
    let created_at: String = row.get(5)?;
    Ok(DatasetVersion {
        id: row.get(0)?,
        dataset_code: row.get(1)?,
        dataset_geid: row.get(2)?,
        version: row.get(3)?,
        created_by: row.get(4)?,
        created_at: parse_datetime(&created_at),
        location: row.get(6)?,
        notes: row.get(7)?,
    })
}

const ATTRIBUTE_COLUMNS: &str = "id, manifest_id, name, type, value, project_code, optional";
const DATASET_VERSION_COLUMNS: &str =
    "id, dataset_code, dataset_geid, version, created_by, created_at, location, notes";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Manifest operations

    fn create_manifest(&self, name: &str, project_code: &str) -> Result<Manifest> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO data_manifest (name, project_code) VALUES (?1, ?2)",
            params![name, project_code],
        )?;
        Ok(Manifest {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            project_code: project_code.to_string(),
        })
    }

    fn get_manifest_by_name(&self, project_code: &str, name: &str) -> Result<Option<Manifest>> {
        self.conn()
            .query_row(
                "SELECT id, name, project_code FROM data_manifest
                 WHERE project_code = ?1 AND name = ?2",
                params![project_code, name],
                row_to_manifest,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_manifests(&self, project_code: &str) -> Result<Vec<Manifest>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, project_code FROM data_manifest
             WHERE project_code = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![project_code], row_to_manifest)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }

    // Attribute operations

    fn create_attribute(&self, attribute: &NewAttribute) -> Result<Attribute> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO data_attribute (manifest_id, name, type, value, project_code, optional)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                attribute.manifest_id,
                attribute.name,
                attribute.attribute_type.as_str(),
                attribute.value,
                attribute.project_code,
                attribute.optional,
            ],
        )?;
        Ok(Attribute {
            id: conn.last_insert_rowid(),
            manifest_id: attribute.manifest_id,
            name: attribute.name.clone(),
            attribute_type: attribute.attribute_type,
            value: attribute.value.clone(),
            optional: attribute.optional,
            project_code: attribute.project_code.clone(),
        })
    }

    fn list_attributes(&self, manifest_id: i64) -> Result<Vec<Attribute>> {
        self.list_attributes_for(&[manifest_id])
    }

    fn list_attributes_for(&self, manifest_ids: &[i64]) -> Result<Vec<Attribute>> {
        if manifest_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; manifest_ids.len()].join(", ");
        let sql = format!(
            "SELECT {ATTRIBUTE_COLUMNS} FROM data_attribute
             WHERE manifest_id IN ({placeholders}) ORDER BY manifest_id, id"
        );

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(manifest_ids.iter()), row_to_attribute)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }

    // Dataset version operations

    fn create_dataset_version(&self, version: &NewDatasetVersion) -> Result<DatasetVersion> {
        let created_at = Utc::now();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO dataset_version
             (dataset_code, dataset_geid, version, created_by, created_at, location, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                version.dataset_code,
                version.dataset_geid,
                version.version,
                version.created_by,
                created_at.to_rfc3339(),
                version.location,
                version.notes,
            ],
        )?;
        Ok(DatasetVersion {
            id: conn.last_insert_rowid(),
            dataset_code: version.dataset_code.clone(),
            dataset_geid: version.dataset_geid.clone(),
            version: version.version.clone(),
            created_by: version.created_by.clone(),
            created_at,
            location: version.location.clone(),
            notes: version.notes.clone(),
        })
    }

    fn list_dataset_versions(&self, dataset_geid: &str) -> Result<Vec<DatasetVersion>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {DATASET_VERSION_COLUMNS} FROM dataset_version
             WHERE dataset_geid = ?1 ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![dataset_geid], row_to_dataset_version)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }
}
