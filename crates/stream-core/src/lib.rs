//! # Stream-Core: Paced Frame Scheduler and Transport Driver
//!
//! This library turns a validated segment plan into a real-time binary
//! stream: a [`FrameScheduler`] emits one frame per pacing tick over a
//! [`Transport`], while a concurrent consumer drains the transport's event
//! channel, and a [`StreamDriver`] walks the session through
//! `Idle -> Streaming -> Draining -> Closed`.
//!
//! ## Guarantees
//!
//! - **Drift-free pacing**: frame N is sent no earlier than
//!   `start + N * frame_duration`, scheduled against absolute deadlines, so
//!   send latency never accumulates across a run.
//! - **Plan-order delivery**: frames go out strictly sequentially in
//!   segment order; the receive path never blocks the sender.
//! - **Fail fast, no retry**: a transport fault aborts the stream
//!   immediately and permanently; one scenario per session.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use audioprobe_signal_core::{Segment, SegmentPlan};
//! use audioprobe_stream_core::{DriverConfig, StreamDriver, WsConfig, WsTransport};
//!
//! # async fn run() -> audioprobe_stream_core::Result<()> {
//! let plan = SegmentPlan::new(vec![
//!     Segment::silence(1000),
//!     Segment::tone(440.0, 0.5, 2000),
//!     Segment::silence(1000),
//! ]);
//!
//! let (transport, events) =
//!     WsTransport::connect("ws://127.0.0.1:8989/ws", WsConfig::default()).await?;
//! let mut driver = StreamDriver::new(transport, DriverConfig::default());
//! let stats = driver.run(&plan, events).await?;
//! assert_eq!(stats.frames_sent, 200);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod driver;
pub mod error;
pub mod scheduler;
pub mod transport;

pub use driver::{DriverConfig, SessionState, StreamDriver, StreamStats};
pub use error::{Error, Result};
pub use scheduler::FrameScheduler;
pub use transport::{MockTransport, Transport, TransportEvent, WsConfig, WsTransport};

/// Version information for the stream library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
