// Attune V1 Core Entry Point
// Adaptive message calibration over a stdio transport.

mod config;
mod error;
mod pipeline;
mod transport;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::EngineConfig;
use error::AppError;
use pipeline::AdaptiveEngine;
use transport::{IncomingMessage, MessageTransport};

/// Line-oriented stdio transport: `sender: text` per line (sender defaults
/// to "local"), one response line per message.
struct StdioTransport {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl StdioTransport {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }

    fn parse_line(line: &str) -> IncomingMessage {
        match line.split_once(": ") {
            Some((sender, text)) if !sender.trim().is_empty() && !sender.contains(' ') => {
                IncomingMessage::new(text, sender.trim())
            }
            _ => IncomingMessage::new(line, "local"),
        }
    }
}

#[async_trait]
impl MessageTransport for StdioTransport {
    async fn send(&mut self, text: &str, _recipient_id: &str) -> Result<(), AppError> {
        self.stdout
            .write_all(format!("{}\n", text).as_bytes())
            .await?;
        self.stdout.flush().await?;
        Ok(())
    }

    async fn receive(&mut self) -> Option<IncomingMessage> {
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(Self::parse_line(&line)),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env()?;
    let deadline = Duration::from_millis(config.transport_deadline_ms);

    let engine = Arc::new(AdaptiveEngine::new(&config));
    if engine.is_degraded() {
        info!("engine running in degraded mode on default alignment constants");
    }

    info!(
        cache_capacity = config.cache_capacity,
        profile_capacity = config.profile_capacity,
        "attune core ready"
    );

    transport::run_message_loop(engine, StdioTransport::new(), deadline).await;
    Ok(())
}
