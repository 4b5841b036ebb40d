//! inkgate entry point.
//!
//! Boots the cache gateway and serves the host application's messaging
//! channel on stdio. Logging goes to stderr to avoid interfering with the
//! line-JSON protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use inkgate_client::fetch::{FetchClient, FetchConfig, Network};
use inkgate_client::Gateway;
use inkgate_core::{AppConfig, store::CacheDb};

mod handler;
mod protocol;
mod relay;

use handler::MessageHandler;
use protocol::{Inbound, Outbound};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(generation = %config.generation, origin = %config.app_origin, "starting inkgate");

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from_app(&config))?);

    let mut gateway = Gateway::new(config, db, network)?;
    if let Err(err) = gateway.warm().await {
        // An unseeded shell still serves; policies just start cold.
        tracing::warn!(%err, "cache warm-up failed, continuing without precache");
    }
    gateway.activate().await?;
    let gateway = Arc::new(gateway);

    let (tx, mut rx) = mpsc::channel::<Outbound>(64);
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(mut line) => {
                    line.push('\n');
                    if stdout.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                    let _ = stdout.flush().await;
                }
                Err(err) => tracing::error!(%err, "failed to serialize outbound message"),
            }
        }
    });

    let handler = MessageHandler::new(Arc::clone(&gateway), tx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Inbound>(&line) {
            Ok(msg) => handler.dispatch(msg).await,
            Err(err) => tracing::warn!(%err, "skipping malformed message"),
        }
    }

    drop(handler);
    writer.await?;
    Ok(())
}
