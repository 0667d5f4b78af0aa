//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default number of history messages fetched for transcript context.
fn default_history_limit() -> u16 {
    6
}

/// Configuration for the answer-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    pub slack_signing_secret: String,
    /// Answer service endpoint URL (`ANSWER_ENDPOINT`).
    pub answer_endpoint: String,
    /// Optional bearer token for the answer service (`ANSWER_API_KEY`).
    #[serde(default)]
    pub answer_api_key: Option<String>,
    /// Number of prior messages fetched as conversation context
    /// (`HISTORY_LIMIT`). Defaults to 6.
    #[serde(default = "default_history_limit")]
    pub history_limit: u16,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("ANSWER_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.history_limit < 1 || result.history_limit > 1000 {
            return Err(anyhow::anyhow!("History limit must be between 1 and 1000."));
        }

        if result.answer_endpoint.is_empty() {
            return Err(anyhow::anyhow!("Answer service endpoint must be set."));
        }

        Ok(result)
    }
}
