//! `programs` table binding and program-specific finders.

use super::generic::{EntityBinding, Repository};
use super::{timestamp_value, RepoResult};
use crate::model::program::{DegreeKind, Program, ProgramId};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, Row, ToSql};

const PROGRAM_SELECT_SQL: &str = "SELECT
    id,
    course_name,
    degree_kind,
    duration_semesters,
    created_at,
    updated_at
FROM programs";

/// Binding marker for the `programs` table.
pub struct ProgramTable;

pub type ProgramRepository<'p> = Repository<'p, ProgramTable>;

impl ToSql for DegreeKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DegreeKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

impl EntityBinding for ProgramTable {
    type Entity = Program;
    type Id = ProgramId;

    const TABLE: &'static str = "programs";
    const COLUMNS: &'static str =
        "id, course_name, degree_kind, duration_semesters, created_at, updated_at";
    const INSERT_SQL: &'static str = "INSERT INTO programs (
            course_name,
            degree_kind,
            duration_semesters,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id;";
    const INSERT_WITH_ID_SQL: &'static str = "INSERT INTO programs (
            id,
            course_name,
            degree_kind,
            duration_semesters,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id;";
    const UPDATE_SQL: &'static str = "UPDATE programs
        SET
            course_name = ?1,
            degree_kind = ?2,
            duration_semesters = ?3,
            updated_at = ?4
        WHERE id = ?5;";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Program> {
        Ok(Program {
            id: Some(row.get("id")?),
            course_name: row.get("course_name")?,
            degree_kind: row.get("degree_kind")?,
            duration_semesters: row.get("duration_semesters")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn insert_params(program: &Program) -> Vec<Value> {
        vec![
            Value::from(program.course_name.clone()),
            Value::from(program.degree_kind.as_str().to_string()),
            Value::from(program.duration_semesters),
            timestamp_value(program.created_at),
            timestamp_value(program.updated_at),
        ]
    }

    fn update_params(program: &Program) -> Vec<Value> {
        vec![
            Value::from(program.course_name.clone()),
            Value::from(program.degree_kind.as_str().to_string()),
            Value::from(program.duration_semesters),
            timestamp_value(program.updated_at),
        ]
    }

    fn id_of(program: &Program) -> Option<ProgramId> {
        program.id
    }

    fn assign_id(program: &mut Program, id: ProgramId) {
        program.id = Some(id);
    }
}

impl Repository<'_, ProgramTable> {
    /// Programs awarding exactly `kind`.
    pub fn find_by_degree_kind(&self, kind: DegreeKind) -> RepoResult<Vec<Program>> {
        self.execute_query(
            &format!("{PROGRAM_SELECT_SQL} WHERE degree_kind = ?1"),
            params![kind],
        )
    }

    /// Programs whose course name contains `term`.
    pub fn search_by_course_name(&self, term: &str) -> RepoResult<Vec<Program>> {
        self.execute_query(
            &format!("{PROGRAM_SELECT_SQL} WHERE course_name LIKE ?1"),
            params![format!("%{term}%")],
        )
    }
}
