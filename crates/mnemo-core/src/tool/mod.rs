//! Tool abstractions for the agentic loop.
//!
//! Each tool is a concrete type implementing [`Tool`]. The registry stores
//! them type-erased as [`BoxTool`], following the same blanket-impl pattern
//! as `BoxLlmProvider`.

pub mod args;
pub mod builtin;
pub mod memory_tools;
pub mod process;
pub mod registry;
pub mod shell;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use mnemo_types::error::ToolError;
use mnemo_types::llm::ToolDefinition;
use mnemo_types::tool::ToolInvocation;

pub use registry::ToolRegistry;

/// A tool the model may call.
///
/// `execute` receives the parsed invocation and the turn's cancellation
/// token. Implementations must return promptly once the token is cancelled.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments.
    fn parameters(&self) -> Value;

    /// Safe tools run without asking the user for confirmation.
    fn is_safe(&self) -> bool {
        false
    }

    fn execute(
        &self,
        call: &ToolInvocation,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<String, ToolError>> + Send;
}

/// Object-safe version of [`Tool`] with a boxed future.
pub trait ToolDyn: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> Value;

    fn is_safe(&self) -> bool;

    fn execute_boxed<'a>(
        &'a self,
        call: &'a ToolInvocation,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;
}

impl<T: Tool> ToolDyn for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> &str {
        Tool::description(self)
    }

    fn parameters(&self) -> Value {
        Tool::parameters(self)
    }

    fn is_safe(&self) -> bool {
        Tool::is_safe(self)
    }

    fn execute_boxed<'a>(
        &'a self,
        call: &'a ToolInvocation,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(self.execute(call, cancel))
    }
}

/// Type-erased tool stored by the registry.
pub struct BoxTool {
    inner: Box<dyn ToolDyn>,
}

impl BoxTool {
    pub fn new<T: Tool + 'static>(tool: T) -> Self {
        Self {
            inner: Box::new(tool),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn description(&self) -> &str {
        self.inner.description()
    }

    pub fn parameters(&self) -> Value {
        self.inner.parameters()
    }

    pub fn is_safe(&self) -> bool {
        self.inner.is_safe()
    }

    /// The schema entry advertised to the model.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }

    pub async fn execute(
        &self,
        call: &ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<String, ToolError> {
        self.inner.execute_boxed(call, cancel).await
    }
}

impl std::fmt::Debug for BoxTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxTool")
            .field("name", &self.name())
            .field("safe", &self.is_safe())
            .finish()
    }
}
