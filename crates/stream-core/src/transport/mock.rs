//! In-memory transport for driving the scheduler without a network
//!
//! Records every sent frame and can inject a send failure at a chosen frame
//! index. Tests push inbound messages through [`MockTransport::push_message`]
//! to exercise the event-consumer path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvent};

// Matches the WebSocket transport's default
const CHANNEL_CAPACITY: usize = 100;

/// Recording in-memory [`Transport`] implementation
#[derive(Debug)]
pub struct MockTransport {
    sent: Mutex<Vec<Bytes>>,
    closed: AtomicBool,
    close_reported: AtomicBool,
    fail_at: Option<usize>,
    events_tx: mpsc::Sender<TransportEvent>,
}

impl MockTransport {
    /// Create a mock that accepts every send
    pub fn new() -> (Self, mpsc::Receiver<TransportEvent>) {
        Self::with_failure_at(None)
    }

    /// Create a mock whose send fails once `fail_at` frames have succeeded
    ///
    /// `Some(75)` accepts frames 0..75 and fails the 76th send, leaving
    /// exactly 75 recorded frames.
    pub fn with_failure_at(fail_at: Option<usize>) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let transport = Self {
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            close_reported: AtomicBool::new(false),
            fail_at,
            events_tx,
        };
        (transport, events_rx)
    }

    /// Frames recorded so far, in send order
    pub fn sent_frames(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of frames recorded so far
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Inject an inbound text message into the event channel
    pub async fn push_message(&self, text: &str) {
        let _ = self
            .events_tx
            .send(TransportEvent::MessageReceived {
                text: text.to_string(),
            })
            .await;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_frame(&self, frame: Bytes) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }

        let mut sent = self.sent.lock().unwrap();
        if self.fail_at == Some(sent.len()) {
            self.closed.store(true, Ordering::Relaxed);
            return Err(Error::SendFailed("injected transport failure".to_string()));
        }
        sent.push(frame);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Relaxed);
        // A failed send marks the transport closed without an event; the
        // orderly close still reports exactly one Closed
        if !self.close_reported.swap(true, Ordering::Relaxed) {
            let _ = self
                .events_tx
                .send(TransportEvent::Closed {
                    code: Some(1000),
                    reason: String::new(),
                })
                .await;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_frames_in_order() {
        let (transport, _events) = MockTransport::new();
        transport.send_frame(Bytes::from_static(b"one")).await.unwrap();
        transport.send_frame(Bytes::from_static(b"two")).await.unwrap();
        assert_eq!(transport.sent_count(), 2);
        assert_eq!(transport.sent_frames()[1], Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn test_injected_failure_marks_closed() {
        let (transport, _events) = MockTransport::with_failure_at(Some(1));
        transport.send_frame(Bytes::from_static(b"ok")).await.unwrap();
        let err = transport.send_frame(Bytes::from_static(b"no")).await.unwrap_err();
        assert!(matches!(err, Error::SendFailed(_)));
        assert!(transport.is_closed());
        assert_eq!(transport.sent_count(), 1);

        // Closed transports fail fast without recording
        let err = transport.send_frame(Bytes::from_static(b"no")).await.unwrap_err();
        assert!(matches!(err, Error::TransportClosed));
    }

    #[tokio::test]
    async fn test_close_after_send_failure_still_reports_closed() {
        let (transport, mut events) = MockTransport::with_failure_at(Some(0));
        let err = transport.send_frame(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, Error::SendFailed(_)));
        assert!(transport.is_closed());

        // The fail-fast flag must not swallow the orderly close event
        transport.close().await.unwrap();
        assert_eq!(
            events.recv().await,
            Some(TransportEvent::Closed {
                code: Some(1000),
                reason: String::new(),
            })
        );
    }

    #[tokio::test]
    async fn test_close_emits_one_closed_event() {
        let (transport, mut events) = MockTransport::new();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
        assert_eq!(
            events.recv().await,
            Some(TransportEvent::Closed {
                code: Some(1000),
                reason: String::new(),
            })
        );
        drop(transport);
        assert_eq!(events.recv().await, None);
    }
}
