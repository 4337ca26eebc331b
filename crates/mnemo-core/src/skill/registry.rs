//! Skill registry: prompt fragments selected by the user's input.
//!
//! A skill matches when the lowercased input contains its lowercased name,
//! or when one of its `trigger_*` regex parameters matches the raw input.
//! Matched skill prompts are appended to the system prompt.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use regex::Regex;
use tracing::{debug, info, warn};

use mnemo_types::error::RepositoryError;
use mnemo_types::skill::Skill;

use crate::agent::prompt::PromptEnhancer;
use crate::repository::skill::SkillRepository;

const SKILL_CONTEXT_HEADER: &str = "\n\nAdditional context from skills:\n";

/// A skill with its trigger patterns compiled once.
struct LoadedSkill {
    skill: Skill,
    triggers: Vec<(String, Regex)>,
}

impl LoadedSkill {
    fn compile(skill: Skill) -> Self {
        let triggers = skill
            .trigger_patterns()
            .filter_map(|(key, pattern)| match Regex::new(pattern) {
                Ok(regex) => Some((key.to_string(), regex)),
                Err(e) => {
                    warn!(skill_id = %skill.id, key, error = %e, "ignoring invalid trigger pattern");
                    None
                }
            })
            .collect();
        Self { skill, triggers }
    }

    fn matches(&self, input: &str, input_lower: &str) -> bool {
        if !self.skill.enabled {
            return false;
        }
        let name = self.skill.name.to_lowercase();
        if !name.is_empty() && input_lower.contains(&name) {
            debug!(skill_id = %self.skill.id, "skill matched by name");
            return true;
        }
        if let Some((key, _)) = self.triggers.iter().find(|(_, re)| re.is_match(input)) {
            debug!(skill_id = %self.skill.id, pattern_key = %key, "skill matched by pattern");
            return true;
        }
        false
    }
}

/// The built-in skills seeded into an empty store.
pub fn default_skills() -> Vec<Skill> {
    let skill = |id: &str, name: &str, description: &str, prompt: &str| Skill {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        prompt: prompt.to_string(),
        parameters: BTreeMap::new(),
        enabled: true,
    };
    vec![
        skill(
            "code",
            "Code Assistant",
            "Helps with coding tasks",
            "When discussing code, provide clear explanations and well-structured examples. Follow best practices for the relevant language.",
        ),
        skill(
            "explain",
            "Explainer",
            "Provides detailed explanations",
            "When asked to explain something, break it down into clear steps. Use analogies when helpful.",
        ),
        skill(
            "summarize",
            "Summarizer",
            "Creates concise summaries",
            "When summarizing, capture key points and main ideas. Be concise but comprehensive.",
        ),
    ]
}

/// Enabled skills, mirrored from a [`SkillRepository`].
pub struct SkillRegistry<S> {
    store: Arc<S>,
    skills: RwLock<BTreeMap<String, LoadedSkill>>,
}

impl<S: SkillRepository> SkillRegistry<S> {
    /// Load every enabled skill from `store`.
    pub async fn load(store: Arc<S>) -> Result<Self, RepositoryError> {
        let mut skills = BTreeMap::new();
        for skill in store.list().await? {
            if skill.enabled {
                debug!(skill_id = %skill.id, name = %skill.name, "skill loaded");
                skills.insert(skill.id.clone(), LoadedSkill::compile(skill));
            }
        }
        if !skills.is_empty() {
            info!(count = skills.len(), "skills loaded from storage");
        }
        Ok(Self {
            store,
            skills: RwLock::new(skills),
        })
    }

    /// Seed [`default_skills`] when no skills are loaded.
    pub async fn initialize_defaults(&self) -> Result<(), RepositoryError> {
        if !self.is_empty() {
            debug!("skills already exist, skipping defaults initialization");
            return Ok(());
        }
        info!("initializing default skills");
        for skill in default_skills() {
            self.register(skill).await?;
        }
        Ok(())
    }

    /// Persist and activate a skill, replacing any skill with the same id.
    pub async fn register(&self, skill: Skill) -> Result<(), RepositoryError> {
        self.store.save(&skill).await?;
        info!(skill_id = %skill.id, name = %skill.name, enabled = skill.enabled, "skill registered");
        let loaded = LoadedSkill::compile(skill);
        self.write().insert(loaded.skill.id.clone(), loaded);
        Ok(())
    }

    pub async fn unregister(&self, id: &str) -> Result<(), RepositoryError> {
        self.store.delete(id).await?;
        let removed = self.write().remove(id);
        info!(
            skill_id = id,
            name = removed.as_ref().map(|s| s.skill.name.as_str()).unwrap_or(""),
            "skill unregistered"
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Skill> {
        self.read().get(id).map(|loaded| loaded.skill.clone())
    }

    /// All loaded skills, ordered by id.
    pub fn list(&self) -> Vec<Skill> {
        self.read().values().map(|loaded| loaded.skill.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Skills matching `input`, ordered by id.
    pub fn matches(&self, input: &str) -> Vec<Skill> {
        let input_lower = input.to_lowercase();
        let matched: Vec<Skill> = self
            .read()
            .values()
            .filter(|loaded| loaded.matches(input, &input_lower))
            .map(|loaded| loaded.skill.clone())
            .collect();
        if !matched.is_empty() {
            debug!(count = matched.len(), "skills matched");
        }
        matched
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, LoadedSkill>> {
        self.skills.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, LoadedSkill>> {
        self.skills.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: SkillRepository> PromptEnhancer for SkillRegistry<S> {
    fn enhance_prompt(&self, input: &str, base_prompt: &str) -> String {
        let matched = self.matches(input);
        if matched.is_empty() {
            return base_prompt.to_string();
        }

        let names: Vec<&str> = matched.iter().map(|s| s.name.as_str()).collect();
        info!(skills = %names.join(", "), "prompt enhanced with skills");

        let prompts: Vec<&str> = matched.iter().map(|s| s.prompt.as_str()).collect();
        if base_prompt.is_empty() {
            prompts.join("\n")
        } else {
            format!("{base_prompt}{SKILL_CONTEXT_HEADER}{}", prompts.join("\n"))
        }
    }
}
