//! Course use-case service.

use super::ServiceResult;
use crate::db::ConnectionProvider;
use crate::model::course::{Course, CourseId};
use crate::repo::course_repo::CourseRepository;
use crate::repo::RepoResult;
use log::info;

pub struct CourseService<'p> {
    repo: CourseRepository<'p>,
}

impl<'p> CourseService<'p> {
    pub fn new(provider: &'p ConnectionProvider) -> Self {
        Self::with_repository(CourseRepository::new(provider))
    }

    pub fn with_repository(repo: CourseRepository<'p>) -> Self {
        Self { repo }
    }

    /// Validates and persists a new course.
    pub fn create(&self, course: Course) -> ServiceResult<Course> {
        course.validate()?;
        Ok(self.repo.save(course)?)
    }

    /// Replaces the course stored under `id`.
    ///
    /// Returns `Ok(None)` when no such course exists. The stored `created_at`
    /// is kept regardless of what `course` carries, and `updated_at` moves
    /// past the stored value.
    pub fn update(&self, id: CourseId, mut course: Course) -> ServiceResult<Option<Course>> {
        let Some(existing) = self.repo.find_by_id(id)? else {
            return Ok(None);
        };

        course.id = Some(id);
        course.created_at = existing.created_at;
        course.updated_at = existing.updated_at;
        course.validate()?;
        let saved = self.repo.save(course)?;
        info!("event=course_update module=service status=ok id={id}");
        Ok(Some(saved))
    }

    pub fn find_by_id(&self, id: CourseId) -> RepoResult<Option<Course>> {
        self.repo.find_by_id(id)
    }

    pub fn list_all(&self) -> RepoResult<Vec<Course>> {
        self.repo.find_all()
    }

    pub fn remove(&self, id: CourseId) -> RepoResult<bool> {
        self.repo.delete_by_id(id)
    }

    pub fn find_by_platform(&self, platform: &str) -> RepoResult<Vec<Course>> {
        self.repo.find_by_platform(platform)
    }

    pub fn search(&self, term: &str) -> RepoResult<Vec<Course>> {
        self.repo.search_by_name(term)
    }

    pub fn count_all(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
