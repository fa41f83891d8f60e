//! Core persistence logic for the EduBase course catalog.
//! This crate owns the store schema, the repository engine and seeding.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::{AppConfig, ConfigError, DatabaseConfig, LoggingConfig, PoolSettings, SeedConfig};
pub use db::{ConnectionProvider, DbError, DbResult, PoolStatus};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::course::{Course, CourseId};
pub use model::program::{DegreeKind, Program, ProgramId, UnknownDegreeKind};
pub use model::{Timestamped, ValidationError};
pub use repo::course_repo::{CourseRepository, CourseTable};
pub use repo::generic::{EntityBinding, Repository};
pub use repo::program_repo::{ProgramRepository, ProgramTable};
pub use repo::{RepoError, RepoResult};
pub use seed::{ExportReport, SeedError, SeedLoader, SeedReport, SeedResult, SourceOutcome};
pub use service::course_service::CourseService;
pub use service::program_service::ProgramService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
