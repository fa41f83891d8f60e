//! Idempotent seed merge and JSON export.

use super::{SeedError, SeedResult};
use crate::config::SeedConfig;
use crate::db::ConnectionProvider;
use crate::repo::course_repo::CourseRepository;
use crate::repo::generic::{EntityBinding, Repository};
use crate::repo::program_repo::ProgramRepository;
use crate::repo::RepoResult;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const COURSES_FILE_NAME: &str = "courses.json";
pub const PROGRAMS_FILE_NAME: &str = "programs.json";

/// Result of merging one seed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    Loaded {
        /// Entities decoded from the file.
        total: usize,
        /// Entities written to the store.
        inserted: usize,
        /// Entities whose id was already present.
        skipped: usize,
    },
    /// The file does not exist.
    Missing,
    /// The file could not be read or decoded.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub courses: SourceOutcome,
    pub programs: SourceOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub courses_path: PathBuf,
    pub courses: usize,
    pub programs_path: PathBuf,
    pub programs: usize,
}

/// Loads seed files into, and exports them from, the catalog store.
pub struct SeedLoader<'p> {
    courses: CourseRepository<'p>,
    programs: ProgramRepository<'p>,
    sources: SeedConfig,
}

impl<'p> SeedLoader<'p> {
    pub fn new(provider: &'p ConnectionProvider, sources: SeedConfig) -> Self {
        Self {
            courses: CourseRepository::new(provider),
            programs: ProgramRepository::new(provider),
            sources,
        }
    }

    /// Merges every configured source, courses first.
    ///
    /// # Errors
    /// Only provider lifecycle errors abort the run; file and store problems
    /// are logged and reported per source.
    pub fn load_all(&self) -> RepoResult<SeedReport> {
        let started_at = Instant::now();
        info!("event=seed_load module=seed status=start");
        let report = SeedReport {
            courses: self.load_courses()?,
            programs: self.load_programs()?,
        };
        info!(
            "event=seed_load module=seed status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    pub fn load_courses(&self) -> RepoResult<SourceOutcome> {
        merge_source(self.courses, &self.sources.courses)
    }

    pub fn load_programs(&self) -> RepoResult<SourceOutcome> {
        merge_source(self.programs, &self.sources.programs)
    }

    /// Writes `courses.json` and `programs.json` under `dir`, indented, in
    /// the shape [`load_all`](Self::load_all) reads.
    pub fn export_all(&self, dir: &Path) -> SeedResult<ExportReport> {
        std::fs::create_dir_all(dir).map_err(|source| SeedError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let courses = self.courses.find_all()?;
        let courses_path = dir.join(COURSES_FILE_NAME);
        write_json(&courses_path, &courses)?;

        let programs = self.programs.find_all()?;
        let programs_path = dir.join(PROGRAMS_FILE_NAME);
        write_json(&programs_path, &programs)?;

        info!(
            "event=seed_export module=seed status=ok dir={} courses={} programs={}",
            dir.display(),
            courses.len(),
            programs.len()
        );
        Ok(ExportReport {
            courses_path,
            courses: courses.len(),
            programs_path,
            programs: programs.len(),
        })
    }
}

fn merge_source<B>(repo: Repository<'_, B>, path: &Path) -> RepoResult<SourceOutcome>
where
    B: EntityBinding,
    B::Entity: DeserializeOwned,
{
    let entities: Vec<B::Entity> = match read_json(path) {
        Ok(Some(entities)) => entities,
        Ok(None) => {
            warn!(
                "event=seed_source module=seed status=skipped table={} path={} reason=not_found",
                B::TABLE,
                path.display()
            );
            return Ok(SourceOutcome::Missing);
        }
        Err(err) => {
            error!(
                "event=seed_source module=seed status=error table={} error={}",
                B::TABLE,
                err
            );
            return Ok(SourceOutcome::Failed);
        }
    };

    let total = entities.len();
    let mut inserted = 0;
    let mut skipped = 0;
    for entity in entities {
        if let Some(id) = B::id_of(&entity) {
            if repo.exists_by_id(id)? {
                skipped += 1;
                continue;
            }
        }
        if repo.import(entity)?.is_some() {
            inserted += 1;
        }
    }

    info!(
        "event=seed_source module=seed status=ok table={} path={} total={} inserted={} skipped={}",
        B::TABLE,
        path.display(),
        total,
        inserted,
        skipped
    );
    Ok(SourceOutcome::Loaded {
        total,
        inserted,
        skipped,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SeedResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&text).map_err(|source| SeedError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> SeedResult<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(SeedError::Encode)?;
    text.push('\n');
    std::fs::write(path, text).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })
}
