//! `courses` table binding and course-specific finders.

use super::generic::{EntityBinding, Repository};
use super::{timestamp_value, RepoResult};
use crate::model::course::{Course, CourseId};
use rusqlite::types::Value;
use rusqlite::{params, Row};

const COURSE_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    platform,
    created_at,
    updated_at
FROM courses";

/// Binding marker for the `courses` table.
pub struct CourseTable;

pub type CourseRepository<'p> = Repository<'p, CourseTable>;

impl EntityBinding for CourseTable {
    type Entity = Course;
    type Id = CourseId;

    const TABLE: &'static str = "courses";
    const COLUMNS: &'static str = "id, name, description, platform, created_at, updated_at";
    const INSERT_SQL: &'static str = "INSERT INTO courses (
            name,
            description,
            platform,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id;";
    const INSERT_WITH_ID_SQL: &'static str = "INSERT INTO courses (
            id,
            name,
            description,
            platform,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id;";
    const UPDATE_SQL: &'static str = "UPDATE courses
        SET
            name = ?1,
            description = ?2,
            platform = ?3,
            updated_at = ?4
        WHERE id = ?5;";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
        Ok(Course {
            id: Some(row.get("id")?),
            name: row.get("name")?,
            description: row.get("description")?,
            platform: row.get("platform")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn insert_params(course: &Course) -> Vec<Value> {
        vec![
            Value::from(course.name.clone()),
            Value::from(course.description.clone()),
            Value::from(course.platform.clone()),
            timestamp_value(course.created_at),
            timestamp_value(course.updated_at),
        ]
    }

    fn update_params(course: &Course) -> Vec<Value> {
        vec![
            Value::from(course.name.clone()),
            Value::from(course.description.clone()),
            Value::from(course.platform.clone()),
            timestamp_value(course.updated_at),
        ]
    }

    fn id_of(course: &Course) -> Option<CourseId> {
        course.id
    }

    fn assign_id(course: &mut Course, id: CourseId) {
        course.id = Some(id);
    }
}

impl Repository<'_, CourseTable> {
    /// Courses offered on exactly `platform`.
    pub fn find_by_platform(&self, platform: &str) -> RepoResult<Vec<Course>> {
        self.execute_query(
            &format!("{COURSE_SELECT_SQL} WHERE platform = ?1"),
            params![platform],
        )
    }

    /// Courses whose name contains `term` (SQLite `LIKE`, ASCII
    /// case-insensitive).
    pub fn search_by_name(&self, term: &str) -> RepoResult<Vec<Course>> {
        self.execute_query(
            &format!("{COURSE_SELECT_SQL} WHERE name LIKE ?1"),
            params![format!("%{term}%")],
        )
    }
}
