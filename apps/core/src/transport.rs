//! Transport boundary.
//!
//! The calibration pipeline is synchronous and never performs I/O; all
//! interaction with the outside world goes through an asynchronous
//! [`MessageTransport`] collaborator. The runner imposes a deadline on each
//! message: if processing does not finish in time, the unmodified input text
//! is delivered instead, so transport latency policy stays decoupled from
//! the pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::pipeline::AdaptiveEngine;

/// One message handed in by the transport.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub text: String,
    pub sender_id: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(text: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender_id: sender_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Defines the public interface of the external messaging collaborator.
///
/// The core depends only on this seam; how messages actually move (sockets,
/// queues, stdio) is the implementer's business.
#[async_trait]
pub trait MessageTransport: Send {
    /// Deliver a response to a recipient.
    async fn send(&mut self, text: &str, recipient_id: &str) -> Result<(), AppError>;

    /// Wait for the next inbound message; `None` means the stream is closed.
    async fn receive(&mut self) -> Option<IncomingMessage>;
}

/// Drive the engine from a transport until its inbound stream closes.
///
/// Each message is processed on a blocking task under `deadline`; expiry or
/// a processing failure falls back to echoing the trimmed input text. Send
/// failures are logged and the loop continues.
pub async fn run_message_loop<T: MessageTransport>(
    engine: Arc<AdaptiveEngine>,
    mut transport: T,
    deadline: Duration,
) {
    info!("message loop started");

    while let Some(message) = transport.receive().await {
        let sender_id = message.sender_id.clone();
        let fallback = message.text.trim().to_string();

        let engine_for_task = engine.clone();
        let task = tokio::task::spawn_blocking(move || {
            engine_for_task.process(&message.text, &message.sender_id)
        });

        let output = match timeout(deadline, task).await {
            Ok(Ok(output)) => output,
            Ok(Err(join_error)) => {
                error!(sender_id, error = %join_error, "pipeline task failed; echoing input");
                fallback
            }
            Err(_) => {
                warn!(sender_id, "pipeline deadline exceeded; echoing input");
                fallback
            }
        };

        if let Err(e) = transport.send(&output, &sender_id).await {
            error!(sender_id, error = %e, "failed to deliver response");
        }
    }

    info!("message loop stopped");
}
