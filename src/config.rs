//! Application configuration: defaults, optional `config/skin_insight.*` file,
//! then `SKIN_INSIGHT__SECTION__KEY` environment overrides.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub charts: ChartSettings,
    pub session: SessionSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub filter: String,
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    load_from(Some("config/skin_insight"), true)
}

fn load_from(file: Option<&str>, use_env: bool) -> anyhow::Result<AppConfig> {
    let mut builder = config::Config::builder()
        .set_default("api.base_url", "http://127.0.0.1:5000")?
        .set_default("api.timeout_secs", 30)?
        .set_default("charts.width", 720)?
        .set_default("charts.height", 420)?
        .set_default("session.file", "skin_insight_session.json")?
        .set_default("log.filter", "info")?;

    if let Some(file) = file {
        builder = builder.add_source(config::File::with_name(file).required(false));
    }
    if use_env {
        builder = builder.add_source(
            config::Environment::with_prefix("SKIN_INSIGHT")
                .prefix_separator("__")
                .separator("__"),
        );
    }

    Ok(builder.build()?.try_deserialize()?)
}
