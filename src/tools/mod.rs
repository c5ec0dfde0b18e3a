//! Tool registry and dispatcher.
//!
//! A tool is a named, schema-validated operation backed by one JSON-RPC
//! call. The registry is populated once at startup ([`build_registry`]) and
//! is immutable afterwards.
//!
//! [`ToolRegistry::dispatch`] never fails: unknown tools, invalid input and
//! RPC failures all come back as a text [`ToolCallResult`] flagged as an
//! error, so a failing call never disturbs the host session.

pub mod base;
pub mod gate;
pub mod schema;
pub mod zircuit;

pub use gate::{gate, is_extension_chain, ChainExtension, EXTENSIONS};
pub use schema::{InputSchema, ParamKind, ParamSpec, ToolArguments};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DispatchError, RegistryError, RpcCallError};
use crate::rpc::RpcClient;

/// The future returned by a tool handler.
pub type ToolFuture<'a> = BoxFuture<'a, Result<String, RpcCallError>>;

/// A tool handler: validated arguments in, result text out.
pub type ToolHandler = for<'a> fn(&'a RpcClient, &'a ToolArguments) -> ToolFuture<'a>;

/// A registered tool.
#[derive(Clone)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Declared input parameters.
    pub input_schema: InputSchema,
    /// Function producing the result text.
    pub handler: ToolHandler,
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// A tool entry as advertised in `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolListing {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

impl From<&ToolDefinition> for ToolListing {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            name: def.name.to_string(),
            description: def.description.to_string(),
            input_schema: def.input_schema.to_json_schema(),
        }
    }
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Returns the concatenated text of all content items.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect()
    }
}

/// Holds every registered tool, in registration order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: IndexMap<&'static str, ToolDefinition>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] if the name is taken.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), RegistryError> {
        if self.tools.contains_key(definition.name) {
            return Err(RegistryError::DuplicateTool {
                name: definition.name.to_string(),
            });
        }
        tracing::debug!(tool = definition.name, "Registered tool");
        self.tools.insert(definition.name, definition);
        Ok(())
    }

    /// Registers each tool in turn, stopping at the first duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] if any name is taken.
    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = ToolDefinition>,
    ) -> Result<usize, RegistryError> {
        let mut added = 0;
        for definition in definitions {
            self.register(definition)?;
            added += 1;
        }
        Ok(added)
    }

    /// Returns `true` if a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the tool listing for `tools/list`.
    #[must_use]
    pub fn listings(&self) -> Vec<ToolListing> {
        self.tools.values().map(ToolListing::from).collect()
    }

    /// Looks up a tool and validates the arguments against its schema.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownTool`] or [`DispatchError::InvalidInput`].
    pub fn prepare(
        &self,
        name: &str,
        input: &Value,
    ) -> Result<(&ToolDefinition, ToolArguments), DispatchError> {
        let definition = self
            .tools
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool {
                name: name.to_string(),
            })?;

        let arguments = definition
            .input_schema
            .validate(input)
            .map_err(|violations| DispatchError::InvalidInput {
                tool: name.to_string(),
                violations,
            })?;

        Ok((definition, arguments))
    }

    /// Runs a tool call and converts every outcome into a [`ToolCallResult`].
    pub async fn dispatch(&self, client: &RpcClient, name: &str, input: &Value) -> ToolCallResult {
        let (definition, arguments) = match self.prepare(name, input) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Rejected tool call");
                return ToolCallResult::error(e.to_string());
            }
        };

        match (definition.handler)(client, &arguments).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => ToolCallResult::error(format!("Error executing RPC call: {e}")),
        }
    }
}

/// Builds the registry for a network: base tools plus gated extensions.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateTool`] if two tool sets collide.
pub fn build_registry(chain_id: u64) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register_all(base::tools())?;
    gate(chain_id, &mut registry)?;
    Ok(registry)
}

/// Renders a result as plain text: strings unquoted, everything else as JSON.
pub(crate) fn plain_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Renders a result as pretty-printed JSON.
pub(crate) fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
