//! JSON-file implementation of [`SkillRepository`].

use std::path::Path;

use tracing::debug;

use mnemo_core::repository::skill::SkillRepository;
use mnemo_types::error::RepositoryError;
use mnemo_types::skill::Skill;

use super::RecordDir;

/// Stores each skill as `{root}/skills/{id}.json`.
#[derive(Debug)]
pub struct JsonSkillRepository {
    records: RecordDir,
}

impl JsonSkillRepository {
    pub async fn open(root: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            records: RecordDir::open(root.join("skills")).await?,
        })
    }
}

impl SkillRepository for JsonSkillRepository {
    async fn save(&self, skill: &Skill) -> Result<(), RepositoryError> {
        let lock = self.records.lock(&skill.id)?;
        let _guard = lock.write().await;
        self.records.write(&skill.id, skill).await?;
        debug!(id = %skill.id, "skill saved");
        Ok(())
    }

    /// Sorted by id.
    async fn list(&self) -> Result<Vec<Skill>, RepositoryError> {
        self.records.read_all().await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.records.delete(id).await?;
        debug!(id, "skill deleted");
        Ok(())
    }
}
