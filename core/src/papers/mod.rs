//! Paper search backend: the arXiv client and the local paper store

pub mod arxiv;
pub mod store;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use arxiv::{parse_feed, ArxivClient, ARXIV_API_URL};
pub use store::{topic_slug, PaperStore, PAPERS_INFO_FILE};

/// Metadata stored for one paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperInfo {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub pdf_url: String,
    /// Publication date, `YYYY-MM-DD`
    pub published: String,
}

/// A search hit: short arXiv id plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub id: String,
    pub info: PaperInfo,
}

/// Anything that can search for papers by topic
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Return at most `max_results` papers for `topic`, most relevant first
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>>;
}
