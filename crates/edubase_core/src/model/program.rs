//! Degree program record.

use super::{next_update_stamp, now, require_text, Timestamped, ValidationError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type ProgramId = i64;

/// Kind of degree a program awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegreeKind {
    Bachelor,
    Technologist,
    Licentiate,
}

impl DegreeKind {
    pub const ALL: [DegreeKind; 3] = [Self::Bachelor, Self::Technologist, Self::Licentiate];

    /// Stable text used in the `degree_kind` column and in seed files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bachelor => "BACHELOR",
            Self::Technologist => "TECHNOLOGIST",
            Self::Licentiate => "LICENTIATE",
        }
    }
}

impl Display for DegreeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDegreeKind(pub String);

impl Display for UnknownDegreeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown degree kind `{}`; expected BACHELOR|TECHNOLOGIST|LICENTIATE",
            self.0
        )
    }
}

impl std::error::Error for UnknownDegreeKind {}

impl FromStr for DegreeKind {
    type Err = UnknownDegreeKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownDegreeKind(value.to_string()))
    }
}

/// A degree program, e.g. a bachelor's in Computer Science.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    /// Store-assigned identifier; `None` until first insert.
    #[serde(default)]
    pub id: Option<ProgramId>,
    pub course_name: String,
    pub degree_kind: DegreeKind,
    #[serde(default)]
    pub duration_semesters: Option<i32>,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now")]
    pub updated_at: NaiveDateTime,
}

impl Program {
    /// Creates an unsaved program with both timestamps set to now.
    pub fn new(course_name: impl Into<String>, degree_kind: DegreeKind) -> Self {
        let created = now();
        Self {
            id: None,
            course_name: course_name.into(),
            degree_kind,
            duration_semesters: None,
            created_at: created,
            updated_at: created,
        }
    }

    pub fn with_duration_semesters(mut self, semesters: i32) -> Self {
        self.duration_semesters = Some(semesters);
        self
    }

    /// Checks that `course_name` is present. The degree kind is required by
    /// the type itself.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("course_name", &self.course_name)
    }
}

impl Timestamped for Program {
    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    fn mark_created(&mut self, now: NaiveDateTime) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn mark_updated(&mut self, now: NaiveDateTime) {
        self.updated_at = next_update_stamp(self.updated_at, now);
    }
}
