//! On-disk paper cache, one JSON file per search topic

use super::{Paper, PaperInfo};
use crate::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name used inside each topic directory
pub const PAPERS_INFO_FILE: &str = "papers_info.json";

/// Directory name for a topic: lower-cased, anything outside `[a-z0-9_-]`
/// replaced by an underscore so the result is always a single path component
pub fn topic_slug(topic: &str) -> String {
    let slug: String = topic
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if slug.is_empty() {
        "_".to_string()
    } else {
        slug
    }
}

/// Stores paper metadata under `<root>/<topic_slug>/papers_info.json`
#[derive(Debug, Clone)]
pub struct PaperStore {
    root: PathBuf,
}

impl PaperStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the info file for a topic
    pub fn topic_file(&self, topic: &str) -> PathBuf {
        self.root.join(topic_slug(topic)).join(PAPERS_INFO_FILE)
    }

    /// Merge papers into the topic file, returning its path
    pub async fn save(&self, topic: &str, papers: &[Paper]) -> Result<PathBuf> {
        let path = self.topic_file(topic);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut entries = read_topic_file(&path).await?.unwrap_or_default();
        for paper in papers {
            entries.insert(paper.id.clone(), paper.info.clone());
        }

        let json = serde_json::to_string_pretty(&entries)?;
        tokio::fs::write(&path, json).await?;
        tracing::debug!(path = %path.display(), count = papers.len(), "saved papers");
        Ok(path)
    }

    /// Look a paper up across every topic directory
    pub async fn find(&self, paper_id: &str) -> Result<Option<PaperInfo>> {
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(None);
        }

        let mut dirs = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        for dir in dirs {
            let path = dir.join(PAPERS_INFO_FILE);
            match read_topic_file(&path).await {
                Ok(Some(mut entries)) => {
                    if let Some(info) = entries.remove(paper_id) {
                        return Ok(Some(info));
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping unreadable paper file: {}", e);
                }
            }
        }

        Ok(None)
    }
}

async fn read_topic_file(path: &Path) -> Result<Option<BTreeMap<String, PaperInfo>>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paper(id: &str, title: &str) -> Paper {
        Paper {
            id: id.to_string(),
            info: PaperInfo {
                title: title.to_string(),
                authors: vec!["Ada Lovelace".to_string()],
                summary: "Summary".to_string(),
                pdf_url: format!("http://arxiv.org/pdf/{}", id),
                published: "2024-01-01".to_string(),
            },
        }
    }

    #[test]
    fn test_topic_slug() {
        assert_eq!(topic_slug("Machine Learning"), "machine_learning");
        assert_eq!(topic_slug("  rust "), "rust");
        assert_eq!(topic_slug("../outside"), "___outside");
        assert_eq!(topic_slug("/etc"), "_etc");
        assert_eq!(topic_slug(".."), "__");
        assert_eq!(topic_slug(""), "_");
    }

    #[tokio::test]
    async fn test_topic_cannot_escape_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("papers");
        let store = PaperStore::new(&root);

        for topic in ["../outside", "/tmp/elsewhere", "a/../../b", ".."] {
            let path = store.save(topic, &[paper("1", "One")]).await.unwrap();
            assert_eq!(path.parent().unwrap().parent().unwrap(), root.as_path());
        }
        assert!(!dir.path().join("outside").exists());
        assert!(store.find("1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let dir = TempDir::new().unwrap();
        let store = PaperStore::new(dir.path());

        let path = store
            .save("Machine Learning", &[paper("1", "One"), paper("2", "Two")])
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("machine_learning").join(PAPERS_INFO_FILE));

        let info = store.find("2").await.unwrap().unwrap();
        assert_eq!(info.title, "Two");
        assert!(store.find("3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_merges_existing() {
        let dir = TempDir::new().unwrap();
        let store = PaperStore::new(dir.path());

        store.save("rust", &[paper("1", "One")]).await.unwrap();
        store.save("rust", &[paper("2", "Two")]).await.unwrap();

        assert!(store.find("1").await.unwrap().is_some());
        assert!(store.find("2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_across_topics() {
        let dir = TempDir::new().unwrap();
        let store = PaperStore::new(dir.path());

        store.save("rust", &[paper("1", "One")]).await.unwrap();
        store.save("physics", &[paper("9", "Nine")]).await.unwrap();

        assert_eq!(store.find("9").await.unwrap().unwrap().title, "Nine");
    }

    #[tokio::test]
    async fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let store = PaperStore::new(dir.path().join("does-not-exist"));
        assert!(store.find("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_skipped() {
        let dir = TempDir::new().unwrap();
        let store = PaperStore::new(dir.path());

        std::fs::create_dir_all(dir.path().join("a_broken")).unwrap();
        std::fs::write(dir.path().join("a_broken").join(PAPERS_INFO_FILE), "{not json").unwrap();
        store.save("rust", &[paper("1", "One")]).await.unwrap();

        assert!(store.find("1").await.unwrap().is_some());
    }
}
