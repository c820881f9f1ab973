use serde::Deserialize;
use std::time::Duration;

use crate::args::ArgMap;
use crate::error::{AppError, Result};

/// Command-line keys that override config values, and the config path they set.
const ARG_OVERRIDES: &[(&str, &str)] = &[
    ("host", "gitlab.host"),
    ("token", "gitlab.token"),
    ("projectId", "gitlab.project_id"),
    ("perPage", "gitlab.per_page"),
    ("model", "llm.model"),
    ("startPage", "pipeline.start_page"),
    ("dryRun", "pipeline.dry_run"),
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gitlab: GitLabConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Deserialize, Clone)]
pub struct GitLabConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub token: String,
    /// Numeric id or `group/project` path.
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_gitlab_timeout")]
    pub timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the access token
impl std::fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("host", &self.host)
            .field("token", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("per_page", &self.per_page)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            project_id: String::new(),
            per_page: default_per_page(),
            timeout_secs: default_gitlab_timeout(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    /// Corrective re-prompts allowed per issue before giving up.
    #[serde(default = "default_max_corrections")]
    pub max_corrections: u32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_corrections", &self.max_corrections)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: 0.0,
            max_corrections: default_max_corrections(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_action_delay")]
    pub action_delay_ms: u64,
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Retries after the first attempt.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: default_action_delay(),
            page_delay_ms: default_page_delay(),
            retry_delay_ms: default_retry_delay(),
            retry_attempts: default_retry_attempts(),
            start_page: default_start_page(),
            dry_run: false,
        }
    }
}

impl PipelineConfig {
    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_per_page() -> u32 {
    100
}

fn default_gitlab_timeout() -> u64 {
    30
}

fn default_llm_url() -> String {
    "https://api.moonshot.cn/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "moonshot-v1-8k".to_string()
}

fn default_max_corrections() -> u32 {
    3
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_action_delay() -> u64 {
    200
}

fn default_page_delay() -> u64 {
    1000
}

fn default_retry_delay() -> u64 {
    10_000
}

fn default_retry_attempts() -> u32 {
    5
}

fn default_start_page() -> u32 {
    1
}

impl AppConfig {
    /// Layer defaults, the config file, `GITLAB_BULK__*` environment
    /// variables and command-line arguments, in increasing precedence.
    pub fn load(args: &ArgMap) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = args.get("config") {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            // Try default paths
            builder = builder.add_source(config::File::with_name("gitlab-bulk").required(false));
        }

        // Environment variable overrides with GITLAB_BULK_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("GITLAB_BULK")
                .separator("__")
                .try_parsing(true),
        );

        for (arg, key) in ARG_OVERRIDES {
            if let Some(value) = args.get(arg) {
                builder = builder.set_override(*key, value)?;
            }
        }

        let config = builder.build()?;
        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values every tool needs before any request is made.
    pub fn validate(&self) -> Result<()> {
        let gitlab = &self.gitlab;
        if gitlab.host.trim().is_empty() {
            return Err(missing("GitLab host", "--host"));
        }
        if gitlab.token.trim().is_empty() {
            return Err(missing("GitLab access token", "--token"));
        }
        if gitlab.project_id.trim().is_empty() {
            return Err(missing("GitLab project id", "--projectId"));
        }
        if !(1..=100).contains(&gitlab.per_page) {
            return Err(AppError::Config(format!(
                "per_page must be between 1 and 100, got {}",
                gitlab.per_page
            )));
        }
        if self.pipeline.start_page == 0 {
            return Err(AppError::Config("start_page must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Extra checks for tools that call the chat-completion endpoint.
    pub fn validate_llm(&self) -> Result<()> {
        if self.llm.api_url.trim().is_empty() {
            return Err(missing("chat completion URL", "llm.api_url"));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(missing("chat completion API key", "llm.api_key"));
        }
        Ok(())
    }

    pub fn gitlab_token(&self) -> &str {
        &self.gitlab.token
    }
}

fn missing(what: &str, hint: &str) -> AppError {
    AppError::Config(format!("{what} is not set (use {hint})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_pacing() {
        let config = AppConfig::default();
        assert_eq!(config.gitlab.per_page, 100);
        assert_eq!(config.pipeline.action_delay_ms, 200);
        assert_eq!(config.pipeline.page_delay_ms, 1000);
        assert_eq!(config.pipeline.retry_delay_ms, 10_000);
        assert_eq!(config.pipeline.retry_attempts, 5);
        assert_eq!(config.llm.model, "moonshot-v1-8k");
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let file = write_config("[gitlab]\nhost = \"https://gitlab.test\"\nproject_id = \"21\"\n");
        let args = ArgMap::parse([format!("--config={}", file.path().display())]);
        let err = AppConfig::load(&args).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("--token"));
    }

    #[test]
    fn test_args_override_file_values() {
        let file = write_config(
            "[gitlab]\nhost = \"https://gitlab.test\"\ntoken = \"file-token\"\nproject_id = \"21\"\nper_page = 50\n\n[pipeline]\nstart_page = 3\n",
        );
        let args = ArgMap::parse([
            format!("--config={}", file.path().display()),
            "--token=cli-token".to_string(),
            "--perPage=20".to_string(),
            "--dryRun".to_string(),
        ]);
        let config = AppConfig::load(&args).unwrap();
        assert_eq!(config.gitlab_token(), "cli-token");
        assert_eq!(config.gitlab.per_page, 20);
        assert_eq!(config.pipeline.start_page, 3);
        assert!(config.pipeline.dry_run);
    }

    #[test]
    fn test_per_page_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.gitlab.host = "https://gitlab.test".to_string();
        config.gitlab.token = "t".to_string();
        config.gitlab.project_id = "21".to_string();
        config.gitlab.per_page = 1000;
        assert!(config.validate().is_err());
        config.gitlab.per_page = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_llm_key_required_only_for_llm_tools() {
        let config = AppConfig::default();
        let err = config.validate_llm().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.gitlab.token = "glpat-secret".to_string();
        config.llm.api_key = "sk-secret".to_string();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("glpat-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
