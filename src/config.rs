use homedir::my_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_BASE_URL: &str = "http://www.adaderana.lk";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_DELAY_SECS: u64 = 1;
const DEFAULT_MAX_ARTICLES: usize = 10;

/// Default embedding model (same family as the original SentenceTransformer setup)
const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
/// Default model download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_LLM_MAX_TOKENS: usize = 1000;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LLM_API_KEY_ENV: &str = "GROQ_API_KEY";

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Configuration for the scrape pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Homepage to scrape headlines from
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between article requests in seconds (politeness throttle)
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,

    /// Stop scraping once this many articles were collected
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            request_delay_secs: DEFAULT_REQUEST_DELAY_SECS,
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_request_delay_secs() -> u64 {
    DEFAULT_REQUEST_DELAY_SECS
}

fn default_max_articles() -> usize {
    DEFAULT_MAX_ARTICLES
}

/// Configuration for local embedding generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Timeout for model download in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

/// Configuration for the answer-synthesis LLM call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Maximum tokens the model may generate per answer
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_LLM_API_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            api_key_env: DEFAULT_LLM_API_KEY_ENV.to_string(),
        }
    }
}

fn default_llm_api_url() -> String {
    DEFAULT_LLM_API_URL.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

fn default_llm_max_tokens() -> usize {
    DEFAULT_LLM_MAX_TOKENS
}

fn default_llm_timeout_secs() -> u64 {
    DEFAULT_LLM_TIMEOUT_SECS
}

fn default_llm_api_key_env() -> String {
    DEFAULT_LLM_API_KEY_ENV.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Daemon bind address
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            scrape: ScrapeConfig::default(),
            semantic: SemanticConfig::default(),
            llm: LlmConfig::default(),
            base_path: PathBuf::new(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Config {
    fn validate(&self) {
        if self.scrape.base_url.is_empty() {
            panic!("scrape.base_url must not be empty");
        }

        if self.scrape.timeout_secs == 0 {
            panic!("scrape.timeout_secs must be greater than 0");
        }

        if self.scrape.max_articles == 0 {
            panic!("scrape.max_articles must be greater than 0");
        }

        if self.semantic.download_timeout_secs == 0 {
            panic!("semantic.download_timeout_secs must be greater than 0");
        }

        if self.llm.max_tokens == 0 {
            panic!("llm.max_tokens must be greater than 0");
        }

        if self.llm.api_key_env.is_empty() {
            panic!("llm.api_key_env must not be empty");
        }
    }

    /// Base directory for config and model cache.
    ///
    /// `NEWSRAG_BASE_PATH` overrides the default `~/.local/share/newsrag`.
    pub fn resolve_base_path() -> PathBuf {
        std::env::var("NEWSRAG_BASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = my_home()
                    .expect("Could not determine home directory")
                    .expect("Home directory path is empty");
                home.join(".local/share/newsrag")
            })
    }

    pub fn load() -> Self {
        Self::load_with(&Self::resolve_base_path())
    }

    pub fn load_with(base_path: &Path) -> Self {
        std::fs::create_dir_all(base_path).expect("failed to create base directory");

        let config_path = base_path.join("config.yaml");

        // create new if does not exist
        if !config_path.exists() {
            std::fs::write(
                &config_path,
                serde_yml::to_string(&Self::default()).unwrap(),
            )
            .expect("failed to write default config");
        }

        let config_str =
            std::fs::read_to_string(&config_path).expect("config file is not readable");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_path_buf();

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let config_path = self.base_path.join("config.yaml");
        let config_str = serde_yml::to_string(&self).unwrap();
        std::fs::write(config_path, config_str).expect("failed to save config");
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate();
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config = serde_yml::from_str("scrape:\n  max_articles: 3\n").unwrap();
        assert_eq!(config.scrape.max_articles, 3);
        assert_eq!(config.scrape.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.scrape.timeout_secs, 10);
        assert_eq!(config.semantic.model, "all-MiniLM-L6-v2");
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
    }

    #[test]
    #[should_panic(expected = "max_articles")]
    fn zero_article_cap_rejected() {
        let config: Config = serde_yml::from_str("scrape:\n  max_articles: 0\n").unwrap();
        config.validate();
    }

    #[test]
    fn load_creates_default_config() {
        let dir = std::env::temp_dir().join(format!("newsrag-config-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let config = Config::load_with(&dir);
        assert!(dir.join("config.yaml").exists());
        assert_eq!(config.scrape.max_articles, 10);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
