//! Transport abstraction for the stream driver
//!
//! A [`Transport`] is the already-negotiated binary message channel the
//! driver streams over: send a binary frame, close, nothing else. Inbound
//! traffic never surfaces through the trait; every implementation returns an
//! [`mpsc::Receiver`] of [`TransportEvent`]s at construction time, and a
//! consumer task drains it independently of the send path.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

mod mock;
mod ws;

pub use mock::MockTransport;
pub use ws::{WsConfig, WsTransport};

/// Events delivered by a transport's receive path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// An inbound text message from the remote endpoint
    MessageReceived {
        /// Message payload
        text: String,
    },
    /// A transport-level fault on the receive path
    Error {
        /// Human-readable description of the fault
        error: String,
    },
    /// The connection closed; terminal, no further events follow
    Closed {
        /// Close code from the peer, if one was supplied
        code: Option<u16>,
        /// Close reason from the peer, empty when absent
        reason: String,
    },
}

/// A binary message channel carrying one audio frame per message
///
/// Implementations must be cheap to share between the sender and the
/// orchestrator; `close` is idempotent, and once a transport reports closed
/// every subsequent `send_frame` fails fast with
/// [`Error::TransportClosed`](crate::Error::TransportClosed).
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Transmit one frame as a single binary message
    async fn send_frame(&self, frame: Bytes) -> Result<()>;

    /// Close the connection (idempotent)
    async fn close(&self) -> Result<()>;

    /// Whether the transport has been closed, locally or by the peer
    fn is_closed(&self) -> bool;
}
