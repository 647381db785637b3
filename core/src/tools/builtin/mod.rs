//! Built-in tools

pub mod extract_info;
pub mod search_papers;

pub use extract_info::ExtractInfoTool;
pub use search_papers::{SearchPapersTool, DEFAULT_MAX_RESULTS};

use crate::error::Result;
use crate::papers::{PaperSource, PaperStore};
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Registry holding `search_papers` and `extract_info`
pub fn paper_tools(source: Arc<dyn PaperSource>, store: PaperStore) -> Result<ToolRegistry> {
    ToolRegistry::builder()
        .register(SearchPapersTool::new(source, store.clone()))
        .register(ExtractInfoTool::new(store))
        .build()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{Error, ToolError};
    use crate::papers::{Paper, PaperInfo};
    use crate::tools::{ToolCall, ToolExecutor, NO_RESULT};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Returns `count` numbered papers and records every query
    pub(crate) struct StaticSource {
        pub queries: Mutex<Vec<(String, usize)>>,
    }

    impl StaticSource {
        pub fn new() -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaperSource for StaticSource {
        async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>> {
            self.queries
                .lock()
                .unwrap()
                .push((topic.to_string(), max_results));
            Ok((1..=max_results)
                .map(|i| Paper {
                    id: format!("2401.0000{}v1", i),
                    info: PaperInfo {
                        title: format!("Paper {}", i),
                        authors: vec!["Ada Lovelace".to_string()],
                        summary: format!("About {}", topic),
                        pdf_url: format!("http://arxiv.org/pdf/2401.0000{}v1", i),
                        published: "2024-01-01".to_string(),
                    },
                })
                .collect())
        }
    }

    fn executor(dir: &TempDir) -> (ToolExecutor, Arc<StaticSource>) {
        let source = Arc::new(StaticSource::new());
        let registry = paper_tools(source.clone(), PaperStore::new(dir.path())).unwrap();
        (ToolExecutor::new(Arc::new(registry)), source)
    }

    #[test]
    fn test_paper_tool_schemas() {
        let dir = TempDir::new().unwrap();
        let (executor, _) = executor(&dir);
        let schemas = executor.registry().schemas();

        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].name, "search_papers");
        assert_eq!(schemas[0].input_schema["required"], json!(["topic"]));
        assert_eq!(
            schemas[0].input_schema["properties"]["max_results"]["default"],
            json!(5)
        );
        assert_eq!(schemas[1].name, "extract_info");
        assert_eq!(schemas[1].input_schema["required"], json!(["paper_id"]));
    }

    #[tokio::test]
    async fn test_search_returns_joined_ids() {
        let dir = TempDir::new().unwrap();
        let (executor, source) = executor(&dir);

        let call = ToolCall::new(
            "search_papers",
            json!({"topic": "machine learning", "max_results": 3}),
        );
        let content = executor.execute(&call).await.unwrap();

        assert_eq!(content, "2401.00001v1, 2401.00002v1, 2401.00003v1");
        assert_eq!(
            source.queries.lock().unwrap().as_slice(),
            &[("machine learning".to_string(), 3)]
        );
        assert!(dir
            .path()
            .join("machine_learning")
            .join(crate::papers::PAPERS_INFO_FILE)
            .exists());
    }

    #[tokio::test]
    async fn test_search_default_max_results() {
        let dir = TempDir::new().unwrap();
        let (executor, source) = executor(&dir);

        let call = ToolCall::new("search_papers", json!({"topic": "rust"}));
        executor.execute(&call).await.unwrap();
        assert_eq!(source.queries.lock().unwrap()[0].1, DEFAULT_MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_search_rejects_zero_results() {
        let dir = TempDir::new().unwrap();
        let (executor, _) = executor(&dir);

        let call = ToolCall::new("search_papers", json!({"topic": "rust", "max_results": 0}));
        let err = executor.execute(&call).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidParameters { .. })));
    }

    #[tokio::test]
    async fn test_extract_after_search() {
        let dir = TempDir::new().unwrap();
        let (executor, _) = executor(&dir);

        let search = ToolCall::new("search_papers", json!({"topic": "rust", "max_results": 1}));
        executor.execute(&search).await.unwrap();

        let extract = ToolCall::new("extract_info", json!({"paper_id": "2401.00001v1"}));
        let content = executor.execute(&extract).await.unwrap();
        let record: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(record["title"], "Paper 1");
        assert_eq!(record["authors"], json!(["Ada Lovelace"]));
        assert_eq!(record["published"], "2024-01-01");
    }

    #[tokio::test]
    async fn test_extract_unknown_paper_is_sentinel() {
        let dir = TempDir::new().unwrap();
        let (executor, _) = executor(&dir);

        let call = ToolCall::new("extract_info", json!({"paper_id": "nonexistent"}));
        assert_eq!(executor.execute(&call).await.unwrap(), NO_RESULT);
    }
}
