//! Tool registry: the orchestrator's view of every callable tool.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mnemo_types::error::ToolError;
use mnemo_types::llm::ToolDefinition;
use mnemo_types::tool::{ToolInvocation, ToolResult};

use super::builtin::{
    CatTool, CurlTool, DateTool, DfTool, EchoTool, EnvTool, HeadTool, LsTool, PsTool, PwdTool,
    TailTool, UnameTool, WhichTool,
};
use super::memory_tools::{
    MemoryAddTool, MemoryDeleteTool, MemoryListTool, MemorySearchTool, MemoryUpdateTool,
};
use super::shell::ShellTool;
use super::{BoxTool, Tool};
use crate::repository::memory::MemoryRepository;

/// Tools keyed (and therefore listed) by name.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, BoxTool>,
}

impl ToolRegistry {
    /// An empty registry. Turns run in streaming mode when no tools exist.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in system tools plus `shell`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DateTool);
        registry.register(LsTool);
        registry.register(CatTool);
        registry.register(PwdTool);
        registry.register(PsTool);
        registry.register(CurlTool);
        registry.register(WhichTool);
        registry.register(EchoTool);
        registry.register(EnvTool);
        registry.register(HeadTool);
        registry.register(TailTool);
        registry.register(DfTool);
        registry.register(UnameTool);
        registry.register(ShellTool);
        registry
    }

    /// Add the five memory-management tools backed by `store`.
    pub fn with_memory_tools<M: MemoryRepository + 'static>(mut self, store: Arc<M>) -> Self {
        self.register(MemoryAddTool::new(store.clone()));
        self.register(MemoryListTool::new(store.clone()));
        self.register(MemorySearchTool::new(store.clone()));
        self.register(MemoryUpdateTool::new(store.clone()));
        self.register(MemoryDeleteTool::new(store));
        self
    }

    /// Register a tool, replacing any previous tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let tool = BoxTool::new(tool);
        debug!(name = tool.name(), "tool registered");
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&BoxTool> {
        self.tools.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &BoxTool> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Schema entries for every tool, sent with each completion request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(BoxTool::definition).collect()
    }

    /// Whether calls to `name` may skip confirmation. Unknown tools are unsafe.
    pub fn is_safe_tool(&self, name: &str) -> bool {
        self.tools.get(name).is_some_and(BoxTool::is_safe)
    }

    /// Execute one call. Never fails: every error becomes a [`ToolResult`]
    /// error keyed to the call id.
    #[tracing::instrument(name = "tool_execute", skip_all, fields(tool = %call.name, call_id = %call.id))]
    pub async fn execute(&self, call: &ToolInvocation, cancel: &CancellationToken) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!("unknown tool requested");
            return ToolResult::failed(call, format!("unknown tool: {}", call.name));
        };

        if cancel.is_cancelled() {
            return ToolResult::failed(call, ToolError::Cancelled.to_string());
        }

        info!("executing tool");
        let started = Instant::now();
        match tool.execute(call, cancel).await {
            Ok(output) => {
                info!(
                    success = true,
                    output_len = output.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "tool executed"
                );
                ToolResult::ok(call, output)
            }
            Err(e) => {
                warn!(
                    success = false,
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "tool execution failed"
                );
                ToolResult::failed(call, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryMemoryRepository;

    fn call(name: &str, raw: &str) -> ToolInvocation {
        ToolInvocation::parse("call-1", name, raw).unwrap()
    }

    #[test]
    fn test_defaults_are_sorted_and_exclude_memory_tools() {
        let registry = ToolRegistry::with_defaults();
        let names: Vec<&str> = registry.list().map(BoxTool::name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"shell"));
        assert!(names.contains(&"echo"));
        assert!(!names.contains(&"memory_add"));
        assert_eq!(registry.definitions().len(), registry.len());
    }

    #[test]
    fn test_safety_classification() {
        let registry = ToolRegistry::with_defaults()
            .with_memory_tools(Arc::new(InMemoryMemoryRepository::default()));
        for name in [
            "memory_add",
            "memory_list",
            "memory_search",
            "memory_update",
            "memory_delete",
        ] {
            assert!(registry.is_safe_tool(name), "{name} should be safe");
        }
        assert!(!registry.is_safe_tool("shell"));
        assert!(!registry.is_safe_tool("curl"));
        assert!(!registry.is_safe_tool("does_not_exist"));
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::with_defaults();
        let result = registry
            .execute(&call("nope", "{}"), &CancellationToken::new())
            .await;
        assert_eq!(result.tool_call_id, "call-1");
        assert_eq!(result.error.as_deref(), Some("unknown tool: nope"));
    }

    #[tokio::test]
    async fn test_execute_success_and_failure_keyed_to_call() {
        let registry = ToolRegistry::with_defaults();
        let cancel = CancellationToken::new();

        let ok = registry.execute(&call("echo", r#"{"text":"hi"}"#), &cancel).await;
        assert_eq!(ok.output, "hi");
        assert!(!ok.is_error());

        let failed = registry.execute(&call("cat", "{}"), &cancel).await;
        assert_eq!(failed.tool_call_id, "call-1");
        assert_eq!(failed.error.as_deref(), Some("path is required"));
    }

    #[tokio::test]
    async fn test_execute_after_cancellation() {
        let registry = ToolRegistry::with_defaults();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = registry.execute(&call("echo", r#"{"text":"hi"}"#), &cancel).await;
        assert!(result.is_error());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.definitions().is_empty());
    }
}
