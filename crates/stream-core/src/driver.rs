//! Session lifecycle around the paced send loop
//!
//! The driver owns the transport for the session, walks the
//! `Idle -> Streaming -> Draining -> Closed` state machine, and runs the
//! event-consumer task that logs inbound traffic concurrently with the
//! sender. Exactly one plan is played per driver; there is no resume or
//! reconnect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use audioprobe_signal_core::{SegmentPlan, StreamFormat};

use crate::error::Result;
use crate::scheduler::FrameScheduler;
use crate::transport::{Transport, TransportEvent};

// Default post-plan grace period for trailing responses
const DEFAULT_DRAIN_DELAY: Duration = Duration::from_secs(1);
// How long to wait for the event consumer after closing the transport
const CONSUMER_SHUTDOWN: Duration = Duration::from_secs(2);

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection open, plan not yet started
    Idle,
    /// Frames are being emitted on the pacing clock
    Streaming,
    /// Plan complete, waiting out the grace period for trailing responses
    Draining,
    /// Transport closed; terminal
    Closed,
}

/// Driver configuration
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Stream format shared by synthesis and pacing
    pub format: StreamFormat,
    /// Grace period between the last frame and close
    pub drain_delay: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            format: StreamFormat::default(),
            drain_delay: DEFAULT_DRAIN_DELAY,
        }
    }
}

/// Counters for one completed (or aborted) session
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamStats {
    /// Frames actually transmitted
    pub frames_sent: u64,
    /// Bytes actually transmitted
    pub bytes_sent: u64,
    /// Frames the plan called for
    pub planned_frames: u64,
    /// Inbound messages observed by the consumer task
    pub messages_received: u64,
    /// Wall-clock time from first to last send attempt
    pub elapsed: Duration,
}

/// Orchestrates one streaming session over a transport
pub struct StreamDriver<T: Transport> {
    transport: T,
    config: DriverConfig,
    state: SessionState,
    stats: StreamStats,
}

impl<T: Transport> StreamDriver<T> {
    /// Create a driver for an open transport
    pub fn new(transport: T, config: DriverConfig) -> Self {
        Self {
            transport,
            config,
            state: SessionState::Idle,
            stats: StreamStats::default(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Counters recorded so far; complete once `run` has returned
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Play the plan once, drain, and close the transport
    ///
    /// `events` is the receiver returned by the transport at connect time;
    /// a spawned consumer logs every inbound message, error, and close
    /// event without blocking the send loop. On a send failure the error is
    /// returned after the transport is closed; [`StreamDriver::stats`]
    /// still reports how many frames went out.
    pub async fn run(
        &mut self,
        plan: &SegmentPlan,
        events: mpsc::Receiver<TransportEvent>,
    ) -> Result<StreamStats> {
        plan.validate(&self.config.format)?;
        let planned_frames = plan.total_frames(&self.config.format);
        let messages = Arc::new(AtomicU64::new(0));
        let consumer = spawn_event_consumer(events, messages.clone());

        self.state = SessionState::Streaming;
        info!(
            "streaming {} frames ({} segments, {}ms) at {}",
            planned_frames,
            plan.len(),
            plan.total_duration_ms(),
            self.config.format
        );

        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(&self.transport, self.config.format);
        let result = scheduler.run(plan).await;
        let elapsed = start.elapsed();
        let frames_sent = scheduler.frames_sent();

        match &result {
            Ok(()) => {
                self.state = SessionState::Draining;
                debug!("plan complete, draining for {:?}", self.config.drain_delay);
                tokio::time::sleep(self.config.drain_delay).await;
            }
            Err(e) => {
                warn!(
                    "streaming aborted after {} of {} frames: {}",
                    frames_sent, planned_frames, e
                );
            }
        }

        self.state = SessionState::Closed;
        if let Err(e) = self.transport.close().await {
            debug!("error closing transport: {}", e);
        }

        match tokio::time::timeout(CONSUMER_SHUTDOWN, consumer).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("event consumer task failed: {}", e),
            Err(_) => {
                // The counter keeps whatever was observed before the stall
                warn!(
                    "event consumer did not stop after close ({} messages observed)",
                    messages.load(Ordering::Relaxed)
                );
            }
        }
        let messages_received = messages.load(Ordering::Relaxed);

        self.stats = StreamStats {
            frames_sent,
            bytes_sent: frames_sent * self.config.format.frame_bytes() as u64,
            planned_frames,
            messages_received,
            elapsed,
        };

        result?;
        Ok(self.stats)
    }
}

// Spawns the task that logs inbound events until the connection closes.
// Messages are tallied through the shared counter so the count survives a
// consumer that never sees its Closed event.
fn spawn_event_consumer(
    mut events: mpsc::Receiver<TransportEvent>,
    messages: Arc<AtomicU64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                TransportEvent::MessageReceived { text } => {
                    messages.fetch_add(1, Ordering::Relaxed);
                    match serde_json::from_str::<serde_json::Value>(&text) {
                        Ok(value) => info!("received event: {}", value),
                        Err(_) => info!("received message: {}", text),
                    }
                }
                TransportEvent::Error { error } => {
                    error!("transport error: {}", error);
                }
                TransportEvent::Closed { code, reason } => {
                    if reason.is_empty() {
                        info!("connection closed (code {:?})", code);
                    } else {
                        info!("connection closed (code {:?}, reason {:?})", code, reason);
                    }
                    break;
                }
            }
        }
    })
}
