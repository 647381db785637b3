//! arXiv export API client

use super::{Paper, PaperInfo, PaperSource};
use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Public arXiv query endpoint
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry>(.*?)</entry>").expect("static regex"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<id>(.*?)</id>").expect("static regex"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("static regex"));
static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary[^>]*>(.*?)</summary>").expect("static regex"));
static PUBLISHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<published>\s*(\d{4}-\d{2}-\d{2})").expect("static regex"));
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<author>\s*<name>(.*?)</name>").expect("static regex")
});
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<link\s([^>]*?)/?>").expect("static regex"));
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("static regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("static regex")
});

/// Searches arXiv over HTTP
pub struct ArxivClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
    /// Create a client for the public endpoint
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paperchat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: ARXIV_API_URL.to_string(),
        })
    }

    /// Point the client at another endpoint
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>> {
        tracing::debug!(topic, max_results, "querying arXiv");

        let query = [
            ("search_query", format!("all:{}", topic)),
            ("start", "0".to_string()),
            ("max_results", max_results.to_string()),
            ("sortBy", "relevance".to_string()),
            ("sortOrder", "descending".to_string()),
        ];

        let body = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut papers = parse_feed(&body)?;
        papers.truncate(max_results);
        tracing::info!(topic, found = papers.len(), "arXiv search finished");
        Ok(papers)
    }
}

/// Parse an arXiv Atom feed into papers, in feed order
pub fn parse_feed(feed: &str) -> Result<Vec<Paper>> {
    if !feed.contains("<feed") {
        return Err(Error::Generic(
            "arXiv response is not an Atom feed".to_string(),
        ));
    }

    ENTRY_RE
        .captures_iter(feed)
        .map(|cap| parse_entry(&cap[1]))
        .collect()
}

fn parse_entry(entry: &str) -> Result<Paper> {
    let id_url = capture(&ID_RE, entry)
        .ok_or_else(|| Error::Generic("arXiv entry without <id>".to_string()))?;
    let id = short_id(&id_url);

    let pdf_url = LINK_RE
        .captures_iter(entry)
        .map(|cap| cap[1].to_string())
        .find(|attrs| attrs.contains(r#"title="pdf""#))
        .and_then(|attrs| HREF_RE.captures(&attrs).map(|c| unescape(&c[1])))
        .unwrap_or_else(|| format!("http://arxiv.org/pdf/{}", id));

    let info = PaperInfo {
        title: capture(&TITLE_RE, entry).unwrap_or_default(),
        authors: AUTHOR_RE
            .captures_iter(entry)
            .map(|cap| collapse_whitespace(&unescape(&cap[1])))
            .collect(),
        summary: capture(&SUMMARY_RE, entry).unwrap_or_default(),
        pdf_url,
        published: PUBLISHED_RE
            .captures(entry)
            .map(|c| c[1].to_string())
            .unwrap_or_default(),
    };

    Ok(Paper { id, info })
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .map(|cap| collapse_whitespace(&unescape(&cap[1])))
}

/// `http://arxiv.org/abs/2401.01234v2` -> `2401.01234v2`
fn short_id(id_url: &str) -> String {
    id_url
        .split_once("/abs/")
        .map(|(_, id)| id)
        .unwrap_or(id_url)
        .trim()
        .to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode XML entities in one pass. Unknown or invalid references are kept.
fn unescape(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                    .and_then(|code| code.ok())
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
