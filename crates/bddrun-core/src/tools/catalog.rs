//! Tool catalog: the named collection of known tool definitions.
//!
//! The CLI looks tools up by id (e.g. `bddrun run nose`). User-defined tools
//! from the config file are registered after the built-ins and replace any
//! built-in with the same id.

use std::collections::BTreeMap;

use super::ToolDefinition;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid tool definition {id:?}: {reason}")]
    InvalidTool { id: String, reason: String },
}

/// Known [`ToolDefinition`]s, keyed by id.
///
/// # Example
///
/// ```ignore
/// let mut catalog = ToolCatalog::with_builtins();
/// catalog.register(my_tool)?;
/// let nose = catalog.get("nose").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ToolCatalog {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the built-in tools.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for tool in super::builtins() {
            catalog.tools.insert(tool.id.clone(), tool);
        }
        catalog
    }

    /// Register a tool definition under its id.
    ///
    /// The definition is validated first. If a tool with the same id is
    /// already registered, it is replaced and the old one is returned.
    pub fn register(&mut self, tool: ToolDefinition) -> Result<Option<ToolDefinition>, CatalogError> {
        tool.validate()?;
        Ok(self.tools.insert(tool.id.clone(), tool))
    }

    /// Look up a tool by id.
    pub fn get(&self, id: &str) -> Option<&ToolDefinition> {
        self.tools.get(id)
    }

    /// All registered tools, ordered by id.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
