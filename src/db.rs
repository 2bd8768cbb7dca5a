use anyhow::Context;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "marks.sqlite3";

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join(DB_FILE_NAME)
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace.to_string_lossy()
        )
    })?;
    let conn = Connection::open(db_path(workspace))?;

    // Each statement autocommits; FULL sync makes that commit durable.
    conn.execute_batch("PRAGMA synchronous = FULL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            roll_no TEXT NOT NULL UNIQUE,
            maths INTEGER NOT NULL,
            science INTEGER NOT NULL,
            hindi INTEGER NOT NULL,
            english INTEGER NOT NULL,
            sst INTEGER NOT NULL
        )",
        [],
    )?;
    verify_schema(&conn)?;

    Ok(conn)
}

const STUDENT_COLUMNS: [&str; 7] = ["name", "roll_no", "maths", "science", "hindi", "english", "sst"];

/// Fails unless `conn` holds a `students` table with every column the store reads.
pub fn verify_schema(conn: &Connection) -> anyhow::Result<()> {
    for column in STUDENT_COLUMNS {
        if !table_has_column(conn, "students", column)? {
            anyhow::bail!("students table missing column {}", column);
        }
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
