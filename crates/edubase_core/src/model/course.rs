//! Course record.

use super::{next_update_stamp, now, require_text, Timestamped, ValidationError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type CourseId = i64;

/// One online or in-person course offered on some platform.
///
/// Serialized with camelCase keys; this is the shape of seed and export
/// files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Store-assigned identifier; `None` until first insert.
    #[serde(default)]
    pub id: Option<CourseId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub platform: String,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now")]
    pub updated_at: NaiveDateTime,
}

impl Course {
    /// Creates an unsaved course with both timestamps set to now.
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        let created = now();
        Self {
            id: None,
            name: name.into(),
            description: None,
            platform: platform.into(),
            created_at: created,
            updated_at: created,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks that `name` and `platform` are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("platform", &self.platform)?;
        Ok(())
    }
}

impl Timestamped for Course {
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
