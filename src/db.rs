// SQLite-backed record store for students.
// The handle is explicitly constructed and injected into the service, so
// tests run against an in-memory database instead of a file.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::grading::Division;
use crate::student::Student;

/// Filters applied to the listing query; both combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive substring match on name.
    pub search: Option<String>,
    /// Exact match on the stored division band.
    pub division: Option<String>,
}

/// Shared handle to the student store.
#[derive(Clone)]
pub struct StudentStore {
    conn: Arc<Mutex<Connection>>,
}

impl StudentStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", path.as_ref()))?;

        // WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Self::from_connection(conn)
    }

    /// In-memory store, used as a test double.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(StudentStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    /// Connectivity probe for the health endpoint.
    pub fn is_connected(&self) -> bool {
        self.conn()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }

    /// Count records matching the filter.
    pub fn count_students(&self, filter: &ListFilter) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM students
             WHERE (?1 IS NULL OR instr(lower(name), lower(?1)) > 0)
               AND (?2 IS NULL OR division = ?2)",
            params![filter.search, filter.division],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Fetch one page of records matching the filter, sorted by name.
    pub fn list_students(
        &self,
        filter: &ListFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Student>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, marks, percentage, division, created_at, updated_at
             FROM students
             WHERE (?1 IS NULL OR instr(lower(name), lower(?1)) > 0)
               AND (?2 IS NULL OR division = ?2)
             ORDER BY name ASC
             LIMIT ?3 OFFSET ?4",
        )?;

        let students = stmt
            .query_map(
                params![filter.search, filter.division, limit, skip],
                row_to_student,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }

    /// Fetch one record by id.
    pub fn get_student(&self, id: &str) -> Result<Option<Student>> {
        let conn = self.conn();
        let student = conn
            .query_row(
                "SELECT id, name, marks, percentage, division, created_at, updated_at
                 FROM students WHERE id = ?1",
                params![id],
                row_to_student,
            )
            .optional()?;
        Ok(student)
    }

    /// Insert a new record; id and timestamps are assigned here.
    pub fn insert_student(
        &self,
        name: &str,
        marks: &[f64],
        percentage: f64,
        division: Division,
    ) -> Result<Student> {
        let now = Utc::now();
        let student = Student {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            marks: marks.to_vec(),
            percentage,
            division,
            created_at: now,
            updated_at: now,
        };

        let marks_json = serde_json::to_string(&student.marks)?;
        self.conn().execute(
            "INSERT INTO students (
                id, name, marks, percentage, division, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                student.id,
                student.name,
                marks_json,
                student.percentage,
                student.division.as_str(),
                student.created_at.to_rfc3339(),
                student.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(student)
    }

    /// Replace name, marks, and the derived fields on an existing record,
    /// bumping `updated_at`. Returns None when no record has that id.
    pub fn update_student(
        &self,
        id: &str,
        name: &str,
        marks: &[f64],
        percentage: f64,
        division: Division,
    ) -> Result<Option<Student>> {
        let marks_json = serde_json::to_string(marks)?;
        let updated = self.conn().execute(
            "UPDATE students
             SET name = ?2, marks = ?3, percentage = ?4, division = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                id,
                name,
                marks_json,
                percentage,
                division.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        if updated == 0 {
            return Ok(None);
        }
        self.get_student(id)
    }

    /// Hard delete. Returns false when no record had that id.
    pub fn delete_student(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM students WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            marks TEXT NOT NULL,
            percentage REAL NOT NULL,
            division TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_name ON students(name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_division ON students(division)",
        [],
    )?;

    Ok(())
}

fn row_to_student(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    let marks_json: String = row.get(2)?;
    let division_raw: String = row.get(4)?;
    let created_at_raw: String = row.get(5)?;
    let updated_at_raw: String = row.get(6)?;

    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        marks: serde_json::from_str(&marks_json).map_err(|_| rusqlite::Error::InvalidQuery)?,
        percentage: row.get(3)?,
        division: Division::parse(&division_raw).ok_or(rusqlite::Error::InvalidQuery)?,
        created_at: parse_timestamp(&created_at_raw)?,
        updated_at: parse_timestamp(&updated_at_raw)?,
    })
}

fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidQuery)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::compute_grading;

    fn create_test_store() -> StudentStore {
        StudentStore::open_in_memory().unwrap()
    }

    fn insert_named(store: &StudentStore, name: &str, marks: [f64; 5]) -> Student {
        let (percentage, division) = compute_grading(&marks);
        store
            .insert_student(name, &marks, percentage, division)
            .unwrap()
    }

    #[test]
    fn test_insert_then_get_roundtrip() {
        let store = create_test_store();
        let created = insert_named(&store, "Anna", [80.0, 70.0, 90.0, 60.0, 100.0]);

        let fetched = store.get_student(&created.id).unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, "Anna");
        assert_eq!(fetched.marks, vec![80.0, 70.0, 90.0, 60.0, 100.0]);
        assert_eq!(fetched.percentage, 80.0);
        assert_eq!(fetched.division, Division::Distinction);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = create_test_store();
        let id = uuid::Uuid::new_v4().to_string();

        assert!(store.get_student(&id).unwrap().is_none());
    }

    #[test]
    fn test_update_missing_returns_none() {
        let store = create_test_store();
        let id = uuid::Uuid::new_v4().to_string();

        let result = store
            .update_student(&id, "Anna", &[1.0; 5], 1.0, Division::ThirdClass)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_preserves_id_and_created_at() {
        let store = create_test_store();
        let created = insert_named(&store, "Anna", [80.0, 70.0, 90.0, 60.0, 100.0]);

        let marks = [40.0; 5];
        let (percentage, division) = compute_grading(&marks);
        let updated = store
            .update_student(&created.id, "Annabel", &marks, percentage, division)
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Annabel");
        assert_eq!(updated.percentage, 40.0);
        assert_eq!(updated.division, Division::ThirdClass);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_delete_twice() {
        let store = create_test_store();
        let created = insert_named(&store, "Anna", [50.0; 5]);

        assert!(store.delete_student(&created.id).unwrap());
        assert!(!store.delete_student(&created.id).unwrap());
        assert!(store.get_student(&created.id).unwrap().is_none());
    }

    #[test]
    fn test_list_sorted_and_paginated() {
        let store = create_test_store();
        // Insert out of order to exercise the sort
        for name in [
            "Hannah", "Cara", "Lena", "Anna", "Faye", "Kira", "Dora", "Greta", "Ella", "Ida",
            "Bella", "Joanne",
        ] {
            insert_named(&store, name, [60.0; 5]);
        }

        let filter = ListFilter::default();
        assert_eq!(store.count_students(&filter).unwrap(), 12);

        // Page 2 at limit 5 is records 6-10 of the sorted order
        let page = store.list_students(&filter, 5, 5).unwrap();
        let names: Vec<&str> = page.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Faye", "Greta", "Hannah", "Ida", "Joanne"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let store = create_test_store();
        insert_named(&store, "Anna", [60.0; 5]);
        insert_named(&store, "Joanne", [60.0; 5]);
        insert_named(&store, "Bob", [60.0; 5]);

        let filter = ListFilter {
            search: Some("ann".to_string()),
            division: None,
        };
        assert_eq!(store.count_students(&filter).unwrap(), 2);

        let matches = store.list_students(&filter, 0, 10).unwrap();
        let names: Vec<&str> = matches.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Joanne"]);
    }

    #[test]
    fn test_division_filter_is_exact() {
        let store = create_test_store();
        insert_named(&store, "Anna", [80.0; 5]); // Distinction
        insert_named(&store, "Bob", [60.0; 5]); // First Class
        insert_named(&store, "Cara", [90.0; 5]); // Distinction

        let filter = ListFilter {
            search: None,
            division: Some("Distinction".to_string()),
        };
        let matches = store.list_students(&filter, 0, 10).unwrap();

        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|s| s.division == Division::Distinction));
    }

    #[test]
    fn test_filters_combine() {
        let store = create_test_store();
        insert_named(&store, "Anna", [80.0; 5]); // Distinction
        insert_named(&store, "Joanne", [60.0; 5]); // First Class

        let filter = ListFilter {
            search: Some("ann".to_string()),
            division: Some("First Class".to_string()),
        };
        let matches = store.list_students(&filter, 0, 10).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Joanne");
    }
}
