use std::time::Duration;

use crate::config::Config;
use crate::constants::{DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_SECS};
use crate::retrieval::RetrievalConfig;

#[derive(Debug, Clone)]
/// Runtime settings for [`QueryEngine`](super::QueryEngine).
pub struct EngineSettings {
    pub retrieval: RetrievalConfig,
    /// Deadline for classification, generation and note I/O.
    pub call_timeout: Duration,
    pub max_sessions: u64,
    pub session_idle: Duration,
    pub canned_off_topic: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            canned_off_topic: false,
        }
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            retrieval: RetrievalConfig::from(config),
            call_timeout: config.call_timeout,
            max_sessions: config.max_sessions,
            session_idle: config.session_idle,
            canned_off_topic: config.canned_off_topic,
        }
    }
}

impl EngineSettings {
    /// Applies `timeout` to every external call, retrieval included.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self.retrieval.call_timeout = timeout;
        self
    }

    pub fn with_canned_off_topic(mut self, enabled: bool) -> Self {
        self.canned_off_topic = enabled;
        self
    }
}
