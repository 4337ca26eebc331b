//! Skill repository trait definition.

use mnemo_types::error::RepositoryError;
use mnemo_types::skill::Skill;

/// Repository trait for user-defined skills.
pub trait SkillRepository: Send + Sync {
    fn save(
        &self,
        skill: &Skill,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Every stored skill, sorted by id.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Skill>, RepositoryError>> + Send;

    fn delete(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
