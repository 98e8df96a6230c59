use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";
pub const DEFAULT_KNOWLEDGE_DIR: &str = "me";
pub const DEFAULT_LEADS_LOG: &str = "customer_leads.log";
pub const DEFAULT_FEEDBACK_LOG: &str = "customer_feedback.log";

const CONFIG_DIR_NAME: &str = "frontdesk";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub pushover_user_key: Option<String>,
    pub pushover_token: Option<String>,
    pub pushover_url: String,
    pub knowledge_dir: PathBuf,
    pub leads_log: PathBuf,
    pub feedback_log: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileConfig {
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    openai_base_url: Option<String>,
    pushover_user_key: Option<String>,
    pushover_token: Option<String>,
    pushover_url: Option<String>,
    knowledge_dir: Option<PathBuf>,
    leads_log: Option<PathBuf>,
    feedback_log: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Environment variables override file values; the `.env` file never
    /// overrides the OS environment.
    pub fn load_with_path(explicit_path: Option<&Path>) -> Result<Self> {
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => discover_config_path()?,
        };
        let file_config = load_file_config(&config_path)?;

        dotenvy::dotenv().ok();

        let file = file_config.as_ref();
        Ok(Self {
            openai_api_key: env_non_empty("OPENAI_API_KEY")
                .or_else(|| file_value(file, |c| c.openai_api_key.as_deref())),
            openai_model: env_non_empty("OPENAI_MODEL")
                .or_else(|| file_value(file, |c| c.openai_model.as_deref()))
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: env_non_empty("OPENAI_BASE_URL")
                .or_else(|| file_value(file, |c| c.openai_base_url.as_deref()))
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            pushover_user_key: env_non_empty("PUSHOVER_USER_KEY")
                .or_else(|| file_value(file, |c| c.pushover_user_key.as_deref())),
            pushover_token: env_non_empty("PUSHOVER_TOKEN_KEY")
                .or_else(|| file_value(file, |c| c.pushover_token.as_deref())),
            pushover_url: file_value(file, |c| c.pushover_url.as_deref())
                .unwrap_or_else(|| DEFAULT_PUSHOVER_URL.to_string()),
            knowledge_dir: file
                .and_then(|c| c.knowledge_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KNOWLEDGE_DIR)),
            leads_log: file
                .and_then(|c| c.leads_log.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADS_LOG)),
            feedback_log: file
                .and_then(|c| c.feedback_log.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FEEDBACK_LOG)),
        })
    }
}

fn discover_config_path() -> Result<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if trimmed.is_empty() {
            bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty");
        }

        return Ok(PathBuf::from(trimmed)
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow!("Failed to resolve config path: HOME directory is unavailable"))?;

    Ok(home
        .join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

fn load_file_config(config_path: &Path) -> Result<Option<RawFileConfig>> {
    if !config_path.is_file() {
        return Ok(None);
    }

    let config_text = fs::read_to_string(config_path).map_err(|err| {
        anyhow!(
            "Failed to load config {}: unable to read file: {err}",
            config_path.display()
        )
    })?;

    toml::from_str(&config_text)
        .map(Some)
        .map_err(|err| anyhow!("Failed to load config {}: {err}", config_path.display()))
}

fn file_value(
    file: Option<&RawFileConfig>,
    pick: impl Fn(&RawFileConfig) -> Option<&str>,
) -> Option<String> {
    file.and_then(pick)
        .and_then(|value| non_empty(value).map(ToOwned::to_owned))
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
