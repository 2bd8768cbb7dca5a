use crate::db;
use crate::error::MarksError;
use crate::model::{Scores, StudentRecord};
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const SELECT_COLUMNS: &str = "roll_no, name, maths, science, hindi, english, sst";

/// Owns the workspace connection for the life of a selected workspace.
///
/// Each mutating call commits before returning. Release the connection with
/// [`Store::close`] so close errors are observed instead of swallowed on drop.
pub struct Store {
    conn: Connection,
    workspace: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Replaced,
}

impl Store {
    pub fn open(workspace: &Path) -> anyhow::Result<Store> {
        let conn = db::open_db(workspace)?;
        tracing::debug!(workspace = %workspace.display(), "store opened");
        Ok(Store {
            conn,
            workspace: workspace.to_path_buf(),
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn close(self) -> Result<(), MarksError> {
        let workspace = self.workspace;
        self.conn.close().map_err(|(_, e)| MarksError::Store(e))?;
        tracing::debug!(workspace = %workspace.display(), "store closed");
        Ok(())
    }

    /// Inserts the record, or replaces every field of the row with the same roll number.
    pub fn upsert(&self, record: &StudentRecord) -> Result<UpsertOutcome, MarksError> {
        record.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM students WHERE roll_no = ?",
                [&record.roll_no],
                |r| r.get(0),
            )
            .optional()?;

        let s = &record.scores;
        tx.execute(
            "INSERT INTO students(name, roll_no, maths, science, hindi, english, sst)
             VALUES(?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(roll_no) DO UPDATE SET
               name = excluded.name,
               maths = excluded.maths,
               science = excluded.science,
               hindi = excluded.hindi,
               english = excluded.english,
               sst = excluded.sst",
            (
                &record.name,
                &record.roll_no,
                s.maths,
                s.science,
                s.hindi,
                s.english,
                s.sst,
            ),
        )?;
        tx.commit()?;

        let outcome = if existing.is_some() {
            UpsertOutcome::Replaced
        } else {
            UpsertOutcome::Created
        };
        tracing::info!(roll_no = %record.roll_no, ?outcome, "student saved");
        Ok(outcome)
    }

    /// Returns whether a row was removed. A missing roll number is not an error here.
    pub fn delete_by_roll_no(&self, roll_no: &str) -> Result<bool, MarksError> {
        let removed = self
            .conn
            .execute("DELETE FROM students WHERE roll_no = ?", [roll_no])?;
        if removed > 0 {
            tracing::info!(roll_no, "student deleted");
        } else {
            tracing::debug!(roll_no, "delete matched no student");
        }
        Ok(removed > 0)
    }

    /// Fresh snapshot of every record in insertion order.
    pub fn list_all(&self) -> Result<Vec<StudentRecord>, MarksError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM students ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get(&self, roll_no: &str) -> Result<Option<StudentRecord>, MarksError> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM students WHERE roll_no = ?", SELECT_COLUMNS),
                [roll_no],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    pub fn count(&self) -> Result<i64, MarksError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))?;
        Ok(n)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        roll_no: row.get(0)?,
        name: row.get(1)?,
        scores: Scores {
            maths: row.get(2)?,
            science: row.get(3)?,
            hindi: row.get(4)?,
            english: row.get(5)?,
            sst: row.get(6)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Store) {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::open(dir.path()).expect("open store");
        (dir, store)
    }

    #[test]
    fn upsert_creates_then_replaces_all_fields() {
        let (_dir, store) = open_temp();
        let first = StudentRecord::new("R1", "Alice", Scores::uniform(90));
        assert_eq!(store.upsert(&first).unwrap(), UpsertOutcome::Created);

        let second = StudentRecord::new(
            "R1",
            "Alice Sharma",
            Scores {
                maths: 10,
                science: 20,
                hindi: 30,
                english: 40,
                sst: 50,
            },
        );
        assert_eq!(store.upsert(&second).unwrap(), UpsertOutcome::Replaced);

        let all = store.list_all().unwrap();
        assert_eq!(all, vec![second]);
    }

    #[test]
    fn replaced_record_keeps_its_position() {
        let (_dir, store) = open_temp();
        store
            .upsert(&StudentRecord::new("R1", "Alice", Scores::uniform(90)))
            .unwrap();
        store
            .upsert(&StudentRecord::new("R2", "Bob", Scores::uniform(40)))
            .unwrap();
        store
            .upsert(&StudentRecord::new("R1", "Alice", Scores::uniform(95)))
            .unwrap();

        let rolls: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.roll_no)
            .collect();
        assert_eq!(rolls, vec!["R1", "R2"]);
    }

    #[test]
    fn upsert_rejects_empty_identity() {
        let (_dir, store) = open_temp();
        let err = store
            .upsert(&StudentRecord::new(" ", "Nobody", Scores::uniform(50)))
            .unwrap_err();
        assert!(matches!(err, MarksError::Validation { ref field, .. } if field == "rollNo"));
        let err = store
            .upsert(&StudentRecord::new("R1", "", Scores::uniform(50)))
            .unwrap_err();
        assert!(matches!(err, MarksError::Validation { ref field, .. } if field == "name"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn delete_missing_roll_no_is_a_no_op() {
        let (_dir, store) = open_temp();
        store
            .upsert(&StudentRecord::new("R1", "Alice", Scores::uniform(90)))
            .unwrap();

        assert!(!store.delete_by_roll_no("R404").unwrap());
        assert_eq!(store.count().unwrap(), 1);

        assert!(store.delete_by_roll_no("R1").unwrap());
        assert!(store.get("R1").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().expect("temp dir");
        {
            let store = Store::open(dir.path()).expect("open");
            store
                .upsert(&StudentRecord::new("R2", "Bob", Scores::uniform(40)))
                .unwrap();
            store.close().expect("close");
        }
        let store = Store::open(dir.path()).expect("reopen");
        let bob = store.get("R2").unwrap().expect("persisted");
        assert_eq!(bob.name, "Bob");
        assert_eq!(bob.scores.total(), 200);
    }
}
