//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `ROUGE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_COMPARE_TOP_K, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_EVIDENCE_LIMIT, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_SECS, DEFAULT_TOP_K,
    DEFAULT_TOP_N,
};

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ROUGE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding product review sections. Default: `beauty_products`.
    pub collection: String,

    /// OpenAI-compatible embeddings endpoint.
    pub embedding_url: String,

    pub embedding_model: String,

    pub embedding_api_key: Option<String>,

    /// Cohere-compatible rerank endpoint. `None` selects the lexical reranker.
    pub rerank_url: Option<String>,

    pub rerank_model: String,

    pub rerank_api_key: Option<String>,

    /// Model used for intent classification.
    pub classifier_model: String,

    /// Model used for answer generation.
    pub generation_model: String,

    /// Candidates requested from vector search. Default: `30`.
    pub top_k: usize,

    /// Candidates requested per comparand for comparison queries. Default: `20`.
    pub compare_top_k: usize,

    /// Candidates kept after reranking. Default: `10`.
    pub top_n: usize,

    /// Evidence items kept after section prioritization. Default: `6`.
    pub evidence_limit: usize,

    /// Minimum top rerank score for evidence to be usable. Default: `0.4`.
    pub confidence_threshold: f32,

    /// Timeout applied to every external call. Default: 30s.
    pub call_timeout: Duration,

    /// Root directory for per-session topic notes. Default: `./memories`.
    pub notes_path: PathBuf,

    /// Max live sessions held in memory. Default: `10_000`.
    pub max_sessions: u64,

    /// Idle time after which a session is dropped. Default: 6h.
    pub session_idle: Duration,

    /// Answer off-topic queries from the canned table instead of the generator.
    pub canned_off_topic: bool,
}

/// Default Qdrant URL used when `ROUGE_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "beauty_products";
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_RERANK_MODEL: &str = "rerank-v3.5";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o";

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_api_key: None,
            rerank_url: None,
            rerank_model: DEFAULT_RERANK_MODEL.to_string(),
            rerank_api_key: None,
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            compare_top_k: DEFAULT_COMPARE_TOP_K,
            top_n: DEFAULT_TOP_N,
            evidence_limit: DEFAULT_EVIDENCE_LIMIT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            notes_path: PathBuf::from("./memories"),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            canned_off_topic: false,
        }
    }
}

impl Config {
    const ENV_QDRANT_URL: &'static str = "ROUGE_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "ROUGE_COLLECTION";
    const ENV_EMBEDDING_URL: &'static str = "ROUGE_EMBEDDING_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "ROUGE_EMBEDDING_MODEL";
    const ENV_EMBEDDING_API_KEY: &'static str = "ROUGE_EMBEDDING_API_KEY";
    const ENV_RERANK_URL: &'static str = "ROUGE_RERANK_URL";
    const ENV_RERANK_MODEL: &'static str = "ROUGE_RERANK_MODEL";
    const ENV_RERANK_API_KEY: &'static str = "ROUGE_RERANK_API_KEY";
    const ENV_CLASSIFIER_MODEL: &'static str = "ROUGE_CLASSIFIER_MODEL";
    const ENV_GENERATION_MODEL: &'static str = "ROUGE_GENERATION_MODEL";
    const ENV_TOP_K: &'static str = "ROUGE_TOP_K";
    const ENV_COMPARE_TOP_K: &'static str = "ROUGE_COMPARE_TOP_K";
    const ENV_TOP_N: &'static str = "ROUGE_TOP_N";
    const ENV_EVIDENCE_LIMIT: &'static str = "ROUGE_EVIDENCE_LIMIT";
    const ENV_CONFIDENCE_THRESHOLD: &'static str = "ROUGE_CONFIDENCE_THRESHOLD";
    const ENV_CALL_TIMEOUT_SECS: &'static str = "ROUGE_CALL_TIMEOUT_SECS";
    const ENV_NOTES_PATH: &'static str = "ROUGE_NOTES_PATH";
    const ENV_MAX_SESSIONS: &'static str = "ROUGE_MAX_SESSIONS";
    const ENV_SESSION_IDLE_SECS: &'static str = "ROUGE_SESSION_IDLE_SECS";
    const ENV_CANNED_OFF_TOPIC: &'static str = "ROUGE_CANNED_OFF_TOPIC";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let call_timeout_secs = Self::parse_number_from_env(
            Self::ENV_CALL_TIMEOUT_SECS,
            defaults.call_timeout.as_secs(),
        )?;
        let session_idle_secs = Self::parse_number_from_env(
            Self::ENV_SESSION_IDLE_SECS,
            defaults.session_idle.as_secs(),
        )?;

        Ok(Self {
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            embedding_url: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_URL,
                defaults.embedding_url,
            ),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_api_key: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY),
            rerank_url: Self::parse_optional_string_from_env(Self::ENV_RERANK_URL),
            rerank_model: Self::parse_string_from_env(Self::ENV_RERANK_MODEL, defaults.rerank_model),
            rerank_api_key: Self::parse_optional_string_from_env(Self::ENV_RERANK_API_KEY),
            classifier_model: Self::parse_string_from_env(
                Self::ENV_CLASSIFIER_MODEL,
                defaults.classifier_model,
            ),
            generation_model: Self::parse_string_from_env(
                Self::ENV_GENERATION_MODEL,
                defaults.generation_model,
            ),
            top_k: Self::parse_number_from_env(Self::ENV_TOP_K, defaults.top_k)?,
            compare_top_k: Self::parse_number_from_env(
                Self::ENV_COMPARE_TOP_K,
                defaults.compare_top_k,
            )?,
            top_n: Self::parse_number_from_env(Self::ENV_TOP_N, defaults.top_n)?,
            evidence_limit: Self::parse_number_from_env(
                Self::ENV_EVIDENCE_LIMIT,
                defaults.evidence_limit,
            )?,
            confidence_threshold: Self::parse_number_from_env(
                Self::ENV_CONFIDENCE_THRESHOLD,
                defaults.confidence_threshold,
            )?,
            call_timeout: Duration::from_secs(call_timeout_secs),
            notes_path: Self::parse_path_from_env(Self::ENV_NOTES_PATH, defaults.notes_path),
            max_sessions: Self::parse_number_from_env(
                Self::ENV_MAX_SESSIONS,
                defaults.max_sessions,
            )?,
            session_idle: Duration::from_secs(session_idle_secs),
            canned_off_topic: Self::parse_bool_from_env(
                Self::ENV_CANNED_OFF_TOPIC,
                defaults.canned_off_topic,
            )?,
        })
    }

    /// Validates sizes, the threshold range, and the notes path (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.confidence_threshold,
            });
        }

        for (name, value) in [
            (Self::ENV_TOP_K, self.top_k),
            (Self::ENV_COMPARE_TOP_K, self.compare_top_k),
            (Self::ENV_TOP_N, self.top_n),
            (Self::ENV_EVIDENCE_LIMIT, self.evidence_limit),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { name });
            }
        }

        if self.max_sessions == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_SESSIONS,
            });
        }

        if self.call_timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_CALL_TIMEOUT_SECS,
            });
        }

        if self.top_n > self.top_k {
            return Err(ConfigError::TopNExceedsTopK {
                top_n: self.top_n,
                top_k: self.top_k,
            });
        }

        if self.notes_path.exists() && !self.notes_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.notes_path.clone(),
            });
        }

        Ok(())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_number_from_env<T: FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" | "" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: var_name,
                    value,
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
