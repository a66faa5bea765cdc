//! WebSocket transport backed by tokio-tungstenite
//!
//! One audio frame is sent as one binary WebSocket message; there is no
//! extra framing. The socket is split at connect time: the sink half lives
//! behind an async mutex on the send path, and a spawned receive loop
//! forwards inbound text messages, errors, and the close frame into the
//! event channel.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvent};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

// Default event channel capacity
const DEFAULT_CHANNEL_CAPACITY: usize = 100;
// Default handshake timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Construction options for [`WsTransport`]
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Capacity of the event channel returned by `connect`
    pub channel_capacity: usize,
    /// Timeout applied to the WebSocket handshake
    pub connect_timeout: Duration,
    /// Log every outbound frame at trace level
    pub trace_frames: bool,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            trace_frames: false,
        }
    }
}

/// WebSocket transport for binary audio frames
#[derive(Clone)]
pub struct WsTransport {
    inner: Arc<WsTransportInner>,
}

struct WsTransportInner {
    url: String,
    sink: Mutex<WsSink>,
    closed: AtomicBool,
    close_sent: AtomicBool,
    events_tx: mpsc::Sender<TransportEvent>,
    trace_frames: bool,
}

impl WsTransport {
    /// Connect to a WebSocket endpoint
    ///
    /// Returns the transport plus the receiver side of its event channel.
    /// The receive loop starts immediately and runs until the connection
    /// closes; the final event on the channel is always
    /// [`TransportEvent::Closed`].
    pub async fn connect(
        url: &str,
        config: WsConfig,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let connect = connect_async(url);
        let (socket, _response) = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| Error::ConnectTimeout {
                url: url.to_string(),
                timeout: config.connect_timeout,
            })?
            .map_err(|e| Error::ConnectFailed {
                url: url.to_string(),
                source: e,
            })?;
        info!("websocket connected to {}", url);

        let (sink, stream) = socket.split();
        let (events_tx, events_rx) = mpsc::channel(config.channel_capacity);

        let transport = WsTransport {
            inner: Arc::new(WsTransportInner {
                url: url.to_string(),
                sink: Mutex::new(sink),
                closed: AtomicBool::new(false),
                close_sent: AtomicBool::new(false),
                events_tx,
                trace_frames: config.trace_frames,
            }),
        };

        transport.spawn_receive_loop(stream);

        Ok((transport, events_rx))
    }

    // Spawns the task that drains inbound messages into the event channel
    fn spawn_receive_loop(&self, mut stream: WsStream) {
        let transport = self.clone();
        tokio::spawn(async move {
            let inner = &transport.inner;
            let mut close_reported = false;

            while let Some(result) = stream.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        trace!("received {} byte text message", text.len());
                        if inner
                            .events_tx
                            .send(TransportEvent::MessageReceived { text })
                            .await
                            .is_err()
                        {
                            debug!("event receiver dropped, stopping receive loop");
                            return;
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        // The services this probe targets only answer in text
                        debug!("ignoring {} byte inbound binary message", data.len());
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                    Ok(Message::Close(frame)) => {
                        inner.closed.store(true, Ordering::Relaxed);
                        let (code, reason) = match frame {
                            Some(f) => (Some(u16::from(f.code)), f.reason.into_owned()),
                            None => (None, String::new()),
                        };
                        let _ = inner
                            .events_tx
                            .send(TransportEvent::Closed { code, reason })
                            .await;
                        close_reported = true;
                        break;
                    }
                    Err(e) => {
                        if inner.closed.load(Ordering::Relaxed) {
                            break;
                        }
                        error!("websocket receive error: {}", e);
                        inner.closed.store(true, Ordering::Relaxed);
                        let _ = inner
                            .events_tx
                            .send(TransportEvent::Error {
                                error: format!("receive error: {}", e),
                            })
                            .await;
                        break;
                    }
                }
            }

            // Stream ended without a close frame (peer dropped the socket)
            inner.closed.store(true, Ordering::Relaxed);
            if !close_reported {
                let _ = inner
                    .events_tx
                    .send(TransportEvent::Closed {
                        code: None,
                        reason: String::new(),
                    })
                    .await;
            }
        });
    }

    /// Target URL this transport is connected to
    pub fn url(&self) -> &str {
        &self.inner.url
    }
}

#[async_trait::async_trait]
impl Transport for WsTransport {
    async fn send_frame(&self, frame: Bytes) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }

        if self.inner.trace_frames {
            trace!("sending {} byte binary frame to {}", frame.len(), self.inner.url);
        }

        let mut sink = self.inner.sink.lock().await;
        sink.send(Message::Binary(frame.to_vec()))
            .await
            .map_err(|e| {
                self.inner.closed.store(true, Ordering::Relaxed);
                Error::SendFailed(e.to_string())
            })?;

        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // A failed send flips `closed` without notifying the peer; the
        // close frame must still go out so the receive loop can wind down
        self.inner.closed.store(true, Ordering::Relaxed);
        if self.inner.close_sent.swap(true, Ordering::Relaxed) {
            return Ok(());
        }

        debug!("closing websocket to {}", self.inner.url);
        let mut sink = self.inner.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(None)).await {
            // Peer may have torn the socket down first; closed either way
            debug!("error sending close frame: {}", e);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WsTransport({})", self.inner.url)
    }
}
