//! Tool registry for managing available tools

use crate::error::{ConfigError, Result, ToolError};
use crate::tools::{Tool, ToolSchema};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable name -> tool mapping, built once at startup
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

/// Collects tools before the registry is frozen
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Look up a tool by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| {
                ToolError::NotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Schemas of every registered tool, in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|tool| tool.schema()).collect()
    }

    /// List all registered tool names
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRegistryBuilder {
    /// Register a tool
    pub fn register<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Freeze the registry. Duplicate names are rejected.
    pub fn build(self) -> Result<ToolRegistry> {
        let mut index = HashMap::with_capacity(self.tools.len());
        for (i, tool) in self.tools.iter().enumerate() {
            if index.insert(tool.name().to_string(), i).is_some() {
                return Err(ConfigError::DuplicateTool {
                    name: tool.name().to_string(),
                }
                .into());
            }
        }

        Ok(ToolRegistry {
            tools: self.tools,
            index,
        })
    }
}
