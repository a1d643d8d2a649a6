//! Transport Tests
//!
//! Runs the message loop against a channel-backed mock transport and checks
//! delivery, loop termination and resilience to send failures.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::config::EngineConfig;
use crate::error::AppError;
use crate::pipeline::AdaptiveEngine;
use crate::transport::{run_message_loop, IncomingMessage, MessageTransport};

/// Mock transport: inbound messages come from a channel, outbound responses
/// are collected on another. Closing the inbound sender ends the loop.
struct ChannelTransport {
    inbound: mpsc::Receiver<IncomingMessage>,
    outbound: mpsc::Sender<(String, String)>,
    fail_sends: bool,
}

#[async_trait]
impl MessageTransport for ChannelTransport {
    async fn send(&mut self, text: &str, recipient_id: &str) -> Result<(), AppError> {
        if self.fail_sends {
            return Err(AppError::Transport("simulated delivery failure".to_string()));
        }
        self.outbound
            .send((text.to_string(), recipient_id.to_string()))
            .await
            .map_err(|_| AppError::Transport("outbound channel closed".to_string()))
    }

    async fn receive(&mut self) -> Option<IncomingMessage> {
        self.inbound.recv().await
    }
}

fn harness(
    fail_sends: bool,
) -> (
    mpsc::Sender<IncomingMessage>,
    mpsc::Receiver<(String, String)>,
    ChannelTransport,
) {
    let (inbound_tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, outbound_rx) = mpsc::channel(16);
    let transport = ChannelTransport {
        inbound: inbound_rx,
        outbound: outbound_tx,
        fail_sends,
    };
    (inbound_tx, outbound_rx, transport)
}

#[tokio::test]
async fn test_loop_processes_and_delivers_responses() {
    let engine = Arc::new(AdaptiveEngine::new(&EngineConfig::default()));
    let (inbound_tx, mut outbound_rx, transport) = harness(false);

    inbound_tx
        .send(IncomingMessage::new("Can you help me with this?", "alice"))
        .await
        .unwrap();
    inbound_tx
        .send(IncomingMessage::new("The report is done", "bob"))
        .await
        .unwrap();
    drop(inbound_tx);

    run_message_loop(engine.clone(), transport, Duration::from_secs(5)).await;

    let (first, recipient) = outbound_rx.recv().await.unwrap();
    assert_eq!(
        first,
        "I understand you're asking about this. Can you help me with this? Please."
    );
    assert_eq!(recipient, "alice");

    let (second, recipient) = outbound_rx.recv().await.unwrap();
    assert_eq!(second, "The report is done.");
    assert_eq!(recipient, "bob");

    assert!(outbound_rx.recv().await.is_none());
    assert_eq!(engine.metrics().messages_processed, 2);
}

#[tokio::test]
async fn test_loop_terminates_when_inbound_closes() {
    let engine = Arc::new(AdaptiveEngine::new(&EngineConfig::default()));
    let (inbound_tx, _outbound_rx, transport) = harness(false);
    drop(inbound_tx);

    // No messages at all: the loop must return promptly on its own.
    run_message_loop(engine.clone(), transport, Duration::from_secs(5)).await;
    assert_eq!(engine.metrics().messages_processed, 0);
}

#[tokio::test]
async fn test_send_failure_does_not_stop_the_loop() {
    let engine = Arc::new(AdaptiveEngine::new(&EngineConfig::default()));
    let (inbound_tx, _outbound_rx, transport) = harness(true);

    inbound_tx
        .send(IncomingMessage::new("first message", "alice"))
        .await
        .unwrap();
    inbound_tx
        .send(IncomingMessage::new("second message", "alice"))
        .await
        .unwrap();
    drop(inbound_tx);

    // Both messages are still processed even though every delivery fails.
    run_message_loop(engine.clone(), transport, Duration::from_secs(5)).await;
    assert_eq!(engine.metrics().messages_processed, 2);
}

#[tokio::test]
async fn test_deadline_expiry_echoes_the_input() {
    let engine = Arc::new(AdaptiveEngine::new(&EngineConfig::default()));
    let (inbound_tx, mut outbound_rx, transport) = harness(false);

    // Large enough that processing cannot finish before an already-expired
    // deadline is checked.
    let input = format!("  {}  ", "please review the report and ".repeat(50_000));
    inbound_tx
        .send(IncomingMessage::new(input.clone(), "alice"))
        .await
        .unwrap();
    drop(inbound_tx);

    run_message_loop(engine, transport, Duration::ZERO).await;

    let (delivered, recipient) = outbound_rx.recv().await.unwrap();
    assert_eq!(delivered, input.trim());
    assert_eq!(recipient, "alice");
}

#[tokio::test]
async fn test_senders_accumulate_preference_profiles() {
    let engine = Arc::new(AdaptiveEngine::new(&EngineConfig::default()));
    let (inbound_tx, mut outbound_rx, transport) = harness(false);

    for sender in ["alice", "bob", "carol"] {
        inbound_tx
            .send(IncomingMessage::new("hello there", sender))
            .await
            .unwrap();
    }
    drop(inbound_tx);

    run_message_loop(engine.clone(), transport, Duration::from_secs(5)).await;

    let mut delivered = 0;
    while outbound_rx.recv().await.is_some() {
        delivered += 1;
    }
    assert_eq!(delivered, 3);
    assert_eq!(engine.metrics().profile_count, 3);
}
