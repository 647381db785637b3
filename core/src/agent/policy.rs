//! Tool-choice policy applied to each query

use crate::llm::ToolChoice;
use serde::{Deserialize, Serialize};

/// Words that mark a query as research related
pub const DEFAULT_TOOL_KEYWORDS: &[&str] = &[
    "paper", "arxiv", "research", "author", "summary", "pdf", "published",
];

/// Decides whether the model may call tools for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ToolPolicy {
    /// Tools are always offered with `auto`
    Auto,
    /// `auto` only when the query mentions one of `keywords`, otherwise `none`
    KeywordGated { keywords: Vec<String> },
}

impl ToolPolicy {
    /// Keyword gating with the default vocabulary
    pub fn keyword_gated() -> Self {
        Self::KeywordGated {
            keywords: DEFAULT_TOOL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn choice_for(&self, query: &str) -> ToolChoice {
        match self {
            Self::Auto => ToolChoice::Auto,
            Self::KeywordGated { keywords } => {
                let query = query.to_lowercase();
                if keywords.iter().any(|k| query.contains(&k.to_lowercase())) {
                    ToolChoice::Auto
                } else {
                    ToolChoice::None
                }
            }
        }
    }
}

impl Default for ToolPolicy {
    fn default() -> Self {
        Self::keyword_gated()
    }
}
