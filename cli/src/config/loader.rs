//! Simple CLI configuration loader for paperchat
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./paperchat.json or ./.paperchat/config.json
//! 3. XDG config: $XDG_CONFIG_HOME/paperchat/config.json or the platform config dir
//! 4. Environment variables only (no files)
//!
//! Fields a file leaves out are filled from `OPENAI_API_KEY`, `OPENAI_BASE_URL`
//! and `OPENAI_MODEL`.

use anyhow::{anyhow, Context, Result};
use paperchat_core::config::DEFAULT_MODEL;
use paperchat_core::{AgentConfig, ModelParams, Protocol, ResolvedLlmConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "paperchat.json";
/// Name of the config directory (`.paperchat/` locally, `paperchat/` under XDG)
pub const CONFIG_DIR_NAME: &str = "paperchat";
/// Directory papers are stored under when nothing else is configured
pub const DEFAULT_PAPERS_DIR: &str = "papers";

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// Protocol to use (defaults to "openai")
    pub protocol: Option<String>,
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: Option<String>,
    /// Base URL (optional, uses protocol default if not specified)
    pub base_url: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Model parameters (optional)
    #[serde(default)]
    pub params: ModelParams,
    /// Additional headers (optional)
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Where paper metadata is stored, `~` allowed
    pub papers_dir: Option<String>,
    /// Command that starts the tool server for remote mode
    #[serde(default)]
    pub server_command: Vec<String>,
    /// Orchestration settings
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Loaded configuration plus the file it came from
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub raw: RawConfig,
    pub source: Option<PathBuf>,
}

impl CliConfig {
    /// Resolve to the LLM configuration handed to the core
    pub fn llm_config(&self) -> Result<ResolvedLlmConfig> {
        let raw = &self.raw;

        let protocol = match raw.protocol.as_deref().unwrap_or("openai") {
            "openai" | "openai_compat" => Protocol::OpenAICompat,
            custom => Protocol::Custom(custom.to_string()),
        };

        // Resolve API key (handle env: prefix)
        let api_key = match raw.api_key.as_deref() {
            Some(key) => match key.strip_prefix("env:") {
                Some(var_name) => std::env::var(var_name)
                    .with_context(|| format!("Environment variable not found: {}", var_name))?,
                None => key.to_string(),
            },
            None => {
                return Err(anyhow!(
                    "No API key configured. Set OPENAI_API_KEY, pass --api-key or add api_key to {}",
                    CONFIG_FILE_NAME
                ))
            }
        };

        let base_url = match &raw.base_url {
            Some(url) => url.clone(),
            None => protocol
                .default_base_url()
                .ok_or_else(|| anyhow!("base_url is required for protocol {}", protocol.as_str()))?
                .to_string(),
        };

        let model = raw
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let resolved = ResolvedLlmConfig::new(protocol, base_url, api_key, model)
            .with_params(raw.params.clone())
            .with_headers(raw.headers.clone());

        resolved
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(resolved)
    }

    /// Agent settings, with model params taking precedence where both are set
    pub fn agent_config(&self) -> AgentConfig {
        let mut agent = self.raw.agent.clone();
        if let Some(max_tokens) = self.raw.params.max_tokens {
            agent.max_tokens = max_tokens;
        }
        if self.raw.params.temperature.is_some() {
            agent.temperature = self.raw.params.temperature;
        }
        if self.raw.params.top_p.is_some() {
            agent.top_p = self.raw.params.top_p;
        }
        agent
    }

    /// Papers directory with `~` expanded
    pub fn papers_dir(&self) -> PathBuf {
        let dir = self
            .raw
            .papers_dir
            .as_deref()
            .unwrap_or(DEFAULT_PAPERS_DIR);
        PathBuf::from(shellexpand::tilde(dir).into_owned())
    }
}

/// CLI configuration loader
#[derive(Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    papers_dir_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Set papers directory override
    pub fn with_papers_dir_override(mut self, papers_dir: String) -> Self {
        self.papers_dir_override = Some(papers_dir);
        self
    }

    /// Load configuration and apply environment and flag overrides
    pub async fn load(&self) -> Result<CliConfig> {
        // Step 1: Find and load base configuration
        let (mut raw, source) = if let Some(override_path) = &self.config_override {
            let (raw, path) = self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?;
            (raw, Some(path))
        } else {
            self.search_and_load().await?
        };

        // Step 2: Fill gaps from the environment
        apply_env(&mut raw, |name| std::env::var(name).ok());

        // Step 3: Apply flag overrides
        if let Some(api_key) = &self.api_key_override {
            raw.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            raw.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            raw.model = Some(model.clone());
        }
        if let Some(papers_dir) = &self.papers_dir_override {
            raw.papers_dir = Some(papers_dir.clone());
        }

        match &source {
            Some(path) => tracing::debug!("Loaded configuration from {}", path.display()),
            None => tracing::debug!("No configuration file found, using environment"),
        }

        Ok(CliConfig { raw, source })
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<(RawConfig, Option<PathBuf>)> {
        let cwd = std::env::current_dir()?;
        let mut candidates = vec![
            cwd.join(CONFIG_FILE_NAME),
            cwd.join(format!(".{}", CONFIG_DIR_NAME)).join("config.json"),
        ];
        if let Some(xdg) = xdg_config_dir() {
            candidates.push(xdg.join(CONFIG_DIR_NAME).join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                let raw = load_file(&candidate).await?;
                return Ok((raw, Some(candidate)));
            }
        }

        Ok((RawConfig::default(), None))
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<(RawConfig, PathBuf)> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        if expanded.is_file() {
            Ok((load_file(&expanded).await?, expanded))
        } else if expanded.is_dir() {
            // Try config.json in the directory
            let config_file = expanded.join("config.json");
            if config_file.exists() {
                Ok((load_file(&config_file).await?, config_file))
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    expanded.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", expanded.display()))
        }
    }
}

/// Load a single config file
async fn load_file(path: &Path) -> Result<RawConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Fill unset fields from `OPENAI_*` variables
fn apply_env(raw: &mut RawConfig, var: impl Fn(&str) -> Option<String>) {
    if raw.api_key.is_none() {
        raw.api_key = var("OPENAI_API_KEY").filter(|v| !v.is_empty());
    }
    if raw.base_url.is_none() {
        raw.base_url = var("OPENAI_BASE_URL").filter(|v| !v.is_empty());
    }
    if raw.model.is_none() {
        raw.model = var("OPENAI_MODEL").filter(|v| !v.is_empty());
    }
}

/// Get XDG config directory
fn xdg_config_dir() -> Option<PathBuf> {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) if !xdg_config.is_empty() => Some(PathBuf::from(xdg_config)),
        _ => dirs::config_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperchat_core::ToolPolicy;
    use tempfile::TempDir;

    fn config(raw: RawConfig) -> CliConfig {
        CliConfig { raw, source: None }
    }

    #[tokio::test]
    async fn test_load_from_file_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(
            &path,
            r#"{
                "api_key": "sk-file",
                "model": "gpt-4o-mini",
                "papers_dir": "/tmp/papers",
                "agent": {"max_iterations": 4, "tool_policy": {"mode": "auto"}}
            }"#,
        )
        .unwrap();

        let loaded = CliConfigLoader::new()
            .with_config_override(path.clone())
            .with_model_override("gpt-4o".to_string())
            .load()
            .await
            .unwrap();

        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        let llm = loaded.llm_config().unwrap();
        assert_eq!(llm.api_key, "sk-file");
        assert_eq!(llm.model, "gpt-4o");
        assert_eq!(llm.base_url, "https://api.openai.com/v1");
        assert_eq!(loaded.papers_dir(), PathBuf::from("/tmp/papers"));
        assert_eq!(loaded.agent_config().max_iterations, 4);
        assert_eq!(loaded.agent_config().tool_policy, ToolPolicy::Auto);
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{"api_key": "sk-dir"}"#).unwrap();

        let loaded = CliConfigLoader::new()
            .with_config_override(dir.path().to_path_buf())
            .load()
            .await
            .unwrap();
        assert_eq!(loaded.llm_config().unwrap().api_key, "sk-dir");
    }

    #[tokio::test]
    async fn test_missing_override_path_fails() {
        let result = CliConfigLoader::new()
            .with_config_override(PathBuf::from("/definitely/not/here.json"))
            .load()
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_env_prefixed_api_key() {
        std::env::set_var("PAPERCHAT_TEST_KEY_ENV_PREFIX", "sk-from-env");
        let cfg = config(RawConfig {
            api_key: Some("env:PAPERCHAT_TEST_KEY_ENV_PREFIX".to_string()),
            ..Default::default()
        });
        assert_eq!(cfg.llm_config().unwrap().api_key, "sk-from-env");

        let missing = config(RawConfig {
            api_key: Some("env:PAPERCHAT_TEST_KEY_NOT_SET".to_string()),
            ..Default::default()
        });
        assert!(missing.llm_config().is_err());
    }

    #[test]
    fn test_defaults() {
        let cfg = config(RawConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        });
        let llm = cfg.llm_config().unwrap();
        assert_eq!(llm.model, DEFAULT_MODEL);
        assert_eq!(llm.protocol, Protocol::OpenAICompat);
        assert_eq!(cfg.papers_dir(), PathBuf::from(DEFAULT_PAPERS_DIR));
        assert_eq!(cfg.agent_config().max_tokens, 2024);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = config(RawConfig::default()).llm_config().unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn test_custom_protocol_needs_base_url() {
        let cfg = config(RawConfig {
            protocol: Some("grpc".to_string()),
            api_key: Some("k".to_string()),
            ..Default::default()
        });
        assert!(cfg.llm_config().is_err());
    }

    #[test]
    fn test_env_fills_only_missing_fields() {
        let mut raw = RawConfig {
            model: Some("from-file".to_string()),
            ..Default::default()
        };
        apply_env(&mut raw, |name| match name {
            "OPENAI_API_KEY" => Some("sk-env".to_string()),
            "OPENAI_MODEL" => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(raw.api_key.as_deref(), Some("sk-env"));
        assert_eq!(raw.model.as_deref(), Some("from-file"));
        assert_eq!(raw.base_url, None);
    }

    #[test]
    fn test_params_override_agent_settings() {
        let cfg = config(RawConfig {
            params: ModelParams {
                max_tokens: Some(512),
                temperature: Some(0.2),
                top_p: Some(0.9),
            },
            ..Default::default()
        });
        let agent = cfg.agent_config();
        assert_eq!(agent.max_tokens, 512);
        assert_eq!(agent.temperature, Some(0.2));
        assert_eq!(agent.top_p, Some(0.9));
    }
}
