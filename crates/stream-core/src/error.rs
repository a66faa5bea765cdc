//! Error handling for the stream driver and its transports
//!
//! Configuration problems arrive here wrapped from
//! [`SignalError`](audioprobe_signal_core::SignalError); everything else is
//! a transport fault. There is no retry vocabulary on purpose: a failed
//! send aborts the run.

use std::time::Duration;

use thiserror::Error;

use audioprobe_signal_core::SignalError;

/// Result type alias for stream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while connecting, streaming, or closing
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid format, segment, or plan (detected before any frame is sent)
    #[error("configuration error: {0}")]
    Signal(#[from] SignalError),

    /// The WebSocket handshake failed
    #[error("failed to connect to {url}: {source}")]
    ConnectFailed {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// The WebSocket handshake did not complete in time
    #[error("connecting to {url} timed out after {timeout:?}")]
    ConnectTimeout { url: String, timeout: Duration },

    /// A frame could not be transmitted
    #[error("failed to send frame: {0}")]
    SendFailed(String),

    /// The connection is closed; no further sends are permitted
    #[error("transport closed")]
    TransportClosed,

    /// A WebSocket protocol error outside of send/connect
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
