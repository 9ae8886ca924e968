// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chartgenre_application::{run, InferenceOptions, PipelineOptions};
use chartgenre_config::{load as load_config, AppConfig};
use chartgenre_spotify::{BackoffStrategy, Credentials, RetryPolicy, SpotifyClient};
use chartgenre_storage::{read_input, OutputStore, ResolutionCache};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Enrich chart artists with genre labels from the Spotify catalog.
#[derive(Debug, Parser)]
#[command(name = "chartgenre", version, about)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV of artists (overrides the configured path).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output CSV (overrides the configured path).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip the collaborator and recommendation inference tiers.
    #[arg(long, conflicts_with = "full")]
    fast: bool,

    /// Run every inference tier, including the slow ones.
    #[arg(long)]
    full: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    init_tracing(&config.telemetry.log_level);
    apply_overrides(&mut config, &args);

    let client = build_client(&config)?;
    client
        .authenticate()
        .await
        .context("catalog authentication failed")?;

    let records = read_input(&config.pipeline.input_csv)
        .with_context(|| format!("reading {}", config.pipeline.input_csv.display()))?;
    info!(target: "cli", records = records.len(), "input loaded");

    let store = OutputStore::new(&config.pipeline.output_csv);
    let mut cache = ResolutionCache::load(&config.pipeline.cache_path)?;

    let options = PipelineOptions {
        flush_every: config.pipeline.flush_every,
        search_limit: config.spotify.search_limit,
        inference: InferenceOptions {
            fast_mode: config.pipeline.fast_mode,
            min_tag_count: config.pipeline.min_tag_count,
            dominance_ratio: config.pipeline.dominance_ratio,
            collaborator_cap: config.pipeline.collaborator_cap,
            recommendation_cap: config.pipeline.recommendation_cap,
        },
    };

    let summary = run(&client, &records, &store, &mut cache, &options).await?;

    info!(
        target: "cli",
        processed = summary.processed,
        skipped = summary.skipped,
        resolved = summary.resolved,
        written = summary.written,
        output = %config.pipeline.output_csv.display(),
        "enrichment finished"
    );

    if summary.halted_rate_limited {
        warn!(target: "cli", "stopped early on rate limiting; rerun later to resume");
        std::process::exit(2);
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_level(true);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(input) = &args.input {
        config.pipeline.input_csv = input.clone();
    }
    if let Some(output) = &args.output {
        config.pipeline.output_csv = output.clone();
    }
    if args.fast {
        config.pipeline.fast_mode = true;
    }
    if args.full {
        config.pipeline.fast_mode = false;
    }
}

fn build_client(config: &AppConfig) -> Result<SpotifyClient> {
    if config.spotify.client_id.is_empty() || config.spotify.client_secret.is_empty() {
        bail!(
            "catalog credentials missing: set CHARTGENRE_SPOTIFY__CLIENT_ID and CHARTGENRE_SPOTIFY__CLIENT_SECRET"
        );
    }

    let retry = RetryPolicy {
        max_attempts: config.retry.max_attempts,
        backoff: BackoffStrategy::Exponential {
            base: Duration::from_millis(config.retry.backoff_base_ms),
            cap: Duration::from_millis(config.retry.backoff_cap_ms),
        },
        rate_limit_margin: Duration::from_secs(config.retry.rate_limit_margin_secs),
    };

    let client = SpotifyClient::builder(Credentials {
        client_id: config.spotify.client_id.clone(),
        client_secret: config.spotify.client_secret.clone(),
    })
    .base_url(config.spotify.base_url.clone())
    .auth_url(config.spotify.auth_url.clone())
    .timeout(Duration::from_secs(config.spotify.request_timeout_secs))
    .rate_limit_interval(Duration::from_millis(config.spotify.rate_limit_interval_ms))
    .retry(retry)
    .build()?;

    Ok(client)
}
