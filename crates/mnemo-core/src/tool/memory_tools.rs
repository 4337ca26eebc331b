//! Memory tools that let the model manage long-term memory.
//!
//! All five are safe: they only touch the memory store, never the host.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use mnemo_types::error::{RepositoryError, ToolError};
use mnemo_types::memory::{MANUAL_RELEVANCE, MemoryItem, MemoryType};
use mnemo_types::tool::ToolInvocation;

use super::Tool;
use super::args::{f64_arg, optional_str, required_str};
use crate::repository::memory::MemoryRepository;

fn describe(item: &MemoryItem) -> String {
    format!("[{}] {}", item.memory_type, item.content)
}

fn list_line(item: &MemoryItem) -> String {
    format!(
        "- [{}] {} (id: {}, relevance: {:.2})",
        item.memory_type, item.content, item.id, item.relevance
    )
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn selector_schema(extra: Value) -> Value {
    let mut properties = json!({
        "id": { "type": "string", "description": "Exact memory id" },
        "search": { "type": "string", "description": "Case-insensitive text matching the memory; the first match is used" }
    });
    if let (Some(base), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    json!({ "type": "object", "properties": properties })
}

/// Resolve the `id` or `search` selector of an update/delete call.
async fn select_memory<M: MemoryRepository>(
    store: &M,
    call: &ToolInvocation,
) -> Result<MemoryItem, ToolError> {
    if let Some(id) = optional_str(call, "id") {
        return match store.load(id).await {
            Ok(item) => Ok(item),
            Err(RepositoryError::NotFound) => {
                Err(ToolError::Execution(format!("memory not found: {id}")))
            }
            Err(e) => Err(e.into()),
        };
    }

    if let Some(query) = optional_str(call, "search") {
        let items = store.list().await?;
        return items
            .into_iter()
            .find(|item| contains_ignore_case(&item.content, query))
            .ok_or_else(|| ToolError::Execution(format!("no memory matches \"{query}\"")));
    }

    Err(ToolError::InvalidArguments(
        "either id or search is required".to_string(),
    ))
}

pub struct MemoryAddTool<M> {
    store: Arc<M>,
}

impl<M> MemoryAddTool<M> {
    pub fn new(store: Arc<M>) -> Self {
        Self { store }
    }
}

impl<M: MemoryRepository> Tool for MemoryAddTool<M> {
    fn name(&self) -> &str {
        "memory_add"
    }

    fn description(&self) -> &str {
        "Store a fact, preference, or context about the user for future conversations."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "What to remember" },
                "type": {
                    "type": "string",
                    "enum": ["fact", "preference", "context"],
                    "description": "Kind of memory (default: fact)"
                },
                "relevance": { "type": "number", "description": "Importance between 0 and 1 (default: 1.0)" }
            },
            "required": ["content"]
        })
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        let content = required_str(call, "content")?;
        let memory_type = MemoryType::parse_lenient(optional_str(call, "type").unwrap_or("fact"));
        let relevance = f64_arg(call, "relevance").unwrap_or(MANUAL_RELEVANCE);

        let item = MemoryItem::new(content, memory_type, relevance);
        self.store.save(&item).await?;
        Ok(format!(
            "Memory stored successfully (id: {}) {}",
            item.id,
            describe(&item)
        ))
    }
}

pub struct MemoryListTool<M> {
    store: Arc<M>,
}

impl<M> MemoryListTool<M> {
    pub fn new(store: Arc<M>) -> Self {
        Self { store }
    }
}

impl<M: MemoryRepository> Tool for MemoryListTool<M> {
    fn name(&self) -> &str {
        "memory_list"
    }

    fn description(&self) -> &str {
        "List every stored memory with its id, type, and relevance."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, _call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        let items = self.store.list().await?;
        if items.is_empty() {
            return Ok("No memories stored.".to_string());
        }
        let lines: Vec<String> = items.iter().map(list_line).collect();
        Ok(format!("Stored memories ({}):\n{}", items.len(), lines.join("\n")))
    }
}

pub struct MemorySearchTool<M> {
    store: Arc<M>,
}

impl<M> MemorySearchTool<M> {
    pub fn new(store: Arc<M>) -> Self {
        Self { store }
    }
}

impl<M: MemoryRepository> Tool for MemorySearchTool<M> {
    fn name(&self) -> &str {
        "memory_search"
    }

    fn description(&self) -> &str {
        "Search stored memories by case-insensitive text match."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Text to look for" }
            },
            "required": ["query"]
        })
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        let query = required_str(call, "query")?;
        let matches: Vec<MemoryItem> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|item| contains_ignore_case(&item.content, query))
            .collect();

        if matches.is_empty() {
            return Ok(format!("No memories found matching \"{query}\"."));
        }
        let lines: Vec<String> = matches.iter().map(list_line).collect();
        Ok(format!(
            "Found {} memories matching \"{query}\":\n{}",
            matches.len(),
            lines.join("\n")
        ))
    }
}

pub struct MemoryUpdateTool<M> {
    store: Arc<M>,
}

impl<M> MemoryUpdateTool<M> {
    pub fn new(store: Arc<M>) -> Self {
        Self { store }
    }
}

impl<M: MemoryRepository> Tool for MemoryUpdateTool<M> {
    fn name(&self) -> &str {
        "memory_update"
    }

    fn description(&self) -> &str {
        "Update the content, type, or relevance of a memory selected by id or search text."
    }

    fn parameters(&self) -> Value {
        selector_schema(json!({
            "content": { "type": "string", "description": "New content" },
            "type": { "type": "string", "enum": ["fact", "preference", "context"], "description": "New type" },
            "relevance": { "type": "number", "description": "New importance between 0 and 1" }
        }))
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        if optional_str(call, "id").is_none() && optional_str(call, "search").is_none() {
            return Err(ToolError::InvalidArguments(
                "either id or search is required".to_string(),
            ));
        }

        let content = optional_str(call, "content");
        let memory_type = optional_str(call, "type").map(MemoryType::parse_lenient);
        let relevance = f64_arg(call, "relevance");
        if content.is_none() && memory_type.is_none() && relevance.is_none() {
            return Err(ToolError::InvalidArguments(
                "no updates provided (content, type, or relevance)".to_string(),
            ));
        }

        let mut item = select_memory(self.store.as_ref(), call).await?;
        if let Some(content) = content {
            item.content = content.to_string();
        }
        if let Some(memory_type) = memory_type {
            item.memory_type = memory_type;
        }
        if let Some(relevance) = relevance {
            item.relevance = relevance.clamp(0.0, 1.0);
        }

        self.store.save(&item).await?;
        Ok(format!("Memory updated successfully: {}", describe(&item)))
    }
}

pub struct MemoryDeleteTool<M> {
    store: Arc<M>,
}

impl<M> MemoryDeleteTool<M> {
    pub fn new(store: Arc<M>) -> Self {
        Self { store }
    }
}

impl<M: MemoryRepository> Tool for MemoryDeleteTool<M> {
    fn name(&self) -> &str {
        "memory_delete"
    }

    fn description(&self) -> &str {
        "Delete a memory selected by id or search text."
    }

    fn parameters(&self) -> Value {
        selector_schema(json!({}))
    }

    fn is_safe(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolInvocation, _cancel: &CancellationToken) -> Result<String, ToolError> {
        let item = select_memory(self.store.as_ref(), call).await?;
        self.store.delete(&item.id).await?;
        Ok(format!("Memory deleted successfully: {}", describe(&item)))
    }
}
