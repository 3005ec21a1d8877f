// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use promptgate::{
    api::{start_server, ApiServer},
    config::GatewayConfig,
    upstream::UpstreamClient,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting promptgate generation gateway...");

    let config = GatewayConfig::from_env();

    if config.upstream_api_key.is_empty() {
        tracing::warn!("UPSTREAM_API_KEY is not set; upstream calls will fail");
    }

    let upstream = UpstreamClient::new(
        &config.upstream_endpoint,
        &config.upstream_api_key,
        &config.text_model,
        &config.image_model,
        config.upstream_timeout_secs,
    )?;

    let api_server = ApiServer::new(
        Arc::new(upstream),
        config.text_limit,
        config.image_limit,
        config.extra_blocked_terms.clone(),
    );

    tracing::info!(
        port = config.api_port,
        text_limit = config.text_limit.limit,
        image_limit = config.image_limit.limit,
        "gateway configured"
    );

    start_server(api_server, config.api_port)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    Ok(())
}
