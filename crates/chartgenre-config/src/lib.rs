// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub auth_url: String,
    /// Candidates requested per name search; exactness is enforced locally.
    pub search_limit: u32,
    pub request_timeout_secs: u64,
    /// Minimum spacing between requests, politeness only.
    pub rate_limit_interval_ms: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: "https://api.spotify.com/v1".to_string(),
            auth_url: "https://accounts.spotify.com/api/token".to_string(),
            search_limit: 50,
            request_timeout_secs: 20,
            rate_limit_interval_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    /// Added on top of the provider's retry-after hint.
    pub rate_limit_margin_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_cap_ms: 8_000,
            rate_limit_margin_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    pub cache_path: PathBuf,
    /// Rows buffered between appends to the output file.
    pub flush_every: usize,
    /// Skip the collaborator and recommendation inference tiers.
    pub fast_mode: bool,
    pub min_tag_count: usize,
    pub dominance_ratio: f32,
    pub collaborator_cap: usize,
    pub recommendation_cap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_csv: PathBuf::from("data/cleaned/unique_artists_levels.csv"),
            output_csv: PathBuf::from("data/enriched/artist_genres.csv"),
            cache_path: PathBuf::from("data/enriched/resolution_cache.json"),
            flush_every: 20,
            fast_mode: true,
            min_tag_count: 6,
            dominance_ratio: 2.0,
            collaborator_cap: 20,
            recommendation_cap: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: CHARTGENRE_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("CHARTGENRE_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
