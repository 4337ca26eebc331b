//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by every CLI command.
//! Core services are generic over repository traits; AppState pins them to
//! the JSON-file implementations in `mnemo-infra`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use mnemo_core::agent::{ConfirmHook, Orchestrator, OrchestratorSettings, PromptEnhancer};
use mnemo_core::memory::{MemoryManager, MemorySettings};
use mnemo_core::skill::SkillRegistry;
use mnemo_core::tool::ToolRegistry;
use mnemo_infra::config::{config_path, load_config, load_config_file, resolve_data_dir};
use mnemo_infra::json::{JsonConversationRepository, JsonMemoryRepository, JsonSkillRepository};
use mnemo_infra::llm::create_provider;
use mnemo_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteOrchestrator = Orchestrator<JsonConversationRepository, JsonMemoryRepository>;

pub type ConcreteSkillRegistry = SkillRegistry<JsonSkillRepository>;

/// Resolved configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub path: PathBuf,
}

impl LoadedConfig {
    /// Load the explicit `--config` file, or `{data_dir}/config.toml` with
    /// defaults when it is missing.
    pub async fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        match explicit {
            Some(path) => {
                let config = load_config_file(path)
                    .await
                    .with_context(|| format!("loading config from {}", path.display()))?;
                Ok(Self {
                    config,
                    data_dir,
                    path: path.to_path_buf(),
                })
            }
            None => Ok(Self {
                config: load_config(&data_dir).await,
                path: config_path(&data_dir),
                data_dir,
            }),
        }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.config.storage.resolve_work_dir(&self.data_dir)
    }
}

/// The JSON stores under the work directory. Enough for every command
/// that does not talk to the model.
#[derive(Clone)]
pub struct Stores {
    pub conversations: Arc<JsonConversationRepository>,
    pub memories: Arc<JsonMemoryRepository>,
    pub skills: Arc<ConcreteSkillRegistry>,
    pub work_dir: PathBuf,
}

impl Stores {
    pub async fn open(loaded: &LoadedConfig) -> anyhow::Result<Self> {
        let work_dir = loaded.work_dir();
        tokio::fs::create_dir_all(&work_dir)
            .await
            .with_context(|| format!("creating work directory {}", work_dir.display()))?;

        let conversations = Arc::new(JsonConversationRepository::open(&work_dir).await?);
        let memories = Arc::new(JsonMemoryRepository::open(&work_dir).await?);
        let skill_store = Arc::new(JsonSkillRepository::open(&work_dir).await?);
        let skills = Arc::new(SkillRegistry::load(skill_store).await?);
        skills.initialize_defaults().await?;

        tracing::debug!(work_dir = %work_dir.display(), "stores opened");
        Ok(Self {
            conversations,
            memories,
            skills,
            work_dir,
        })
    }

    /// The built-in tools plus the memory tools bound to this memory store.
    pub fn tool_registry(&self) -> ToolRegistry {
        ToolRegistry::with_defaults().with_memory_tools(Arc::clone(&self.memories))
    }
}

/// Shared application state holding all services.
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub stores: Stores,
    pub config: AppConfig,
}

impl AppState {
    /// Open the stores, build the provider, and wire the orchestrator.
    ///
    /// `confirm` gates unsafe tool calls; `None` lets them run unprompted.
    pub async fn init(loaded: &LoadedConfig, confirm: Option<ConfirmHook>) -> anyhow::Result<Self> {
        let config = loaded.config.clone();
        let stores = Stores::open(loaded).await?;

        let provider = Arc::new(
            create_provider(&config.provider).context(
                "no usable API key; run `mnemo config init` or set MNEMO_API_KEY",
            )?,
        );
        let model = config.provider.model().to_string();

        let memory = Arc::new(MemoryManager::new(
            Arc::clone(&stores.conversations),
            Arc::clone(&stores.memories),
            Arc::clone(&provider),
            MemorySettings::from_context(model.clone(), &config.context),
        ));

        let mut settings = OrchestratorSettings::new(model, config.agent.system_prompt.clone());
        settings.max_iterations = config.agent.max_iterations.max(1);
        settings.turn_timeout = Duration::from_secs(config.agent.turn_timeout_secs.max(1));

        let enhancer: Arc<dyn PromptEnhancer> = Arc::clone(&stores.skills) as Arc<dyn PromptEnhancer>;
        let mut orchestrator = Orchestrator::new(
            provider,
            Arc::new(stores.tool_registry()),
            memory,
            Arc::clone(&stores.conversations),
            settings,
        )
        .with_enhancer(enhancer);
        if let Some(hook) = confirm {
            orchestrator = orchestrator.with_confirmation(hook);
        }

        tracing::info!(
            provider = %config.provider.provider_type,
            model = %config.provider.model(),
            "agent initialized"
        );

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            stores,
            config,
        })
    }

    /// Wait for background summarization before the process exits.
    pub async fn shutdown(&self) {
        self.orchestrator.memory().drain_background().await;
    }
}
