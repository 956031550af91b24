use std::error::Error;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension};
use serde_json::Value;

use crate::state::AppState;

pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// The whole aggregate is stored as one JSON document under this key.
const STATE_KEY: &str = "state";

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "baseline_document_store_v1",
    sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS app_document (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#,
}];

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "I/O error: {}", err),
            StoreError::Db(err) => write!(f, "database error: {}", err),
            StoreError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Db(err) => Some(err),
            StoreError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        StoreError::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Db(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Json(value)
    }
}

pub fn open_connection(path: &str) -> Result<Connection, StoreError> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
    )?;
    let current: i64 = tx
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current && m.version <= CURRENT_SCHEMA_VERSION)
    {
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![migration.version.to_string()],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_name', ?1)",
            params![migration.name],
        )?;
    }
    tx.commit()
}

/// The stored document, unvalidated. Any retrieval fault degrades to
/// `None`; the caller falls back to seed data.
pub fn load_raw(conn: &Connection) -> Option<Value> {
    let text: Option<String> = conn
        .query_row(
            "SELECT value FROM app_document WHERE key = ?1",
            params![STATE_KEY],
            |row| row.get(0),
        )
        .optional()
        .ok()
        .flatten();
    serde_json::from_str(&text?).ok()
}

/// Serializes and writes the whole aggregate in one statement, so a
/// reader never observes a partial document.
pub fn save_state(conn: &Connection, state: &AppState) -> Result<(), StoreError> {
    let document = serde_json::to_string(state)?;
    conn.execute(
        "INSERT OR REPLACE INTO app_document (key, value) VALUES (?1, ?2)",
        params![STATE_KEY, document],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use uuid::Uuid;

    use super::{load_raw, open_connection, save_state};
    use crate::normalize::normalize;
    use crate::seed;

    fn unique_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("projecthub-store-test-{}.sqlite", Uuid::new_v4()))
    }

    #[test]
    fn missing_document_loads_as_none() {
        let path = unique_db_path();
        let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
        assert!(load_raw(&conn).is_none());
        drop(conn);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn save_then_load_round_trips_the_aggregate() {
        let path = unique_db_path();
        let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
        let state = seed::demo_state();
        save_state(&conn, &state).expect("save should succeed");

        let raw = load_raw(&conn).expect("document should exist");
        let loaded = normalize(&raw).expect("stored document should normalize");
        assert_eq!(loaded, state);
        drop(conn);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn second_save_overwrites_the_single_document() {
        let path = unique_db_path();
        let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
        let first = seed::demo_state();
        save_state(&conn, &first).expect("save should succeed");

        let mut second = seed::demo_state();
        second.projects[0].title = "Replaced".to_string();
        save_state(&conn, &second).expect("save should succeed");

        let raw = load_raw(&conn).expect("document should exist");
        assert_eq!(raw["projects"][0]["title"], "Replaced");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM app_document", [], |row| row.get(0))
            .expect("count should query");
        assert_eq!(count, 1);
        drop(conn);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn corrupt_document_loads_as_none() {
        let path = unique_db_path();
        let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
        conn.execute(
            "INSERT OR REPLACE INTO app_document (key, value) VALUES ('state', 'not json')",
            [],
        )
        .expect("insert should succeed");
        assert!(load_raw(&conn).is_none());
        drop(conn);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn schema_version_is_recorded() {
        let path = unique_db_path();
        let conn = open_connection(path.to_str().expect("utf8 path")).expect("db should open");
        let version: String = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .expect("schema version should exist");
        assert_eq!(version, super::CURRENT_SCHEMA_VERSION.to_string());
        drop(conn);
        let _ = std::fs::remove_file(path);
    }
}
