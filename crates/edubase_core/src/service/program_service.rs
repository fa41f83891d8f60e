//! Degree program use-case service.

use super::ServiceResult;
use crate::db::ConnectionProvider;
use crate::model::program::{DegreeKind, Program, ProgramId};
use crate::repo::program_repo::ProgramRepository;
use crate::repo::RepoResult;
use log::info;

pub struct ProgramService<'p> {
    repo: ProgramRepository<'p>,
}

impl<'p> ProgramService<'p> {
    pub fn new(provider: &'p ConnectionProvider) -> Self {
        Self::with_repository(ProgramRepository::new(provider))
    }

    pub fn with_repository(repo: ProgramRepository<'p>) -> Self {
        Self { repo }
    }

    /// Validates and persists a new program.
    pub fn create(&self, program: Program) -> ServiceResult<Program> {
        program.validate()?;
        Ok(self.repo.save(program)?)
    }

    /// Replaces the program stored under `id`, keeping its `created_at`.
    ///
    /// Returns `Ok(None)` when no such program exists.
    pub fn update(&self, id: ProgramId, mut program: Program) -> ServiceResult<Option<Program>> {
        let Some(existing) = self.repo.find_by_id(id)? else {
            return Ok(None);
        };

        program.id = Some(id);
        program.created_at = existing.created_at;
        program.updated_at = existing.updated_at;
        program.validate()?;
        let saved = self.repo.save(program)?;
        info!("event=program_update module=service status=ok id={id}");
        Ok(Some(saved))
    }

    pub fn find_by_id(&self, id: ProgramId) -> RepoResult<Option<Program>> {
        self.repo.find_by_id(id)
    }

    pub fn list_all(&self) -> RepoResult<Vec<Program>> {
        self.repo.find_all()
    }

    pub fn remove(&self, id: ProgramId) -> RepoResult<bool> {
        self.repo.delete_by_id(id)
    }

    pub fn find_by_degree_kind(&self, kind: DegreeKind) -> RepoResult<Vec<Program>> {
        self.repo.find_by_degree_kind(kind)
    }

    pub fn search(&self, term: &str) -> RepoResult<Vec<Program>> {
        self.repo.search_by_course_name(term)
    }

    pub fn count_all(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
