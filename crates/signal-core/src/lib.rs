//! # Signal-Core: Deterministic PCM Synthesis for Stream Probing
//!
//! This library provides the data model and synthesis primitives behind the
//! audioprobe stream generator: a fixed per-run stream format, an ordered
//! segment plan (silence and tone spans), and pure functions that turn a
//! synthesis spec into signed 16-bit little-endian PCM bytes.
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs always yield byte-identical buffers —
//!   no hidden state, no randomness.
//! - **Fail fast**: every invalid numeric input (fractional frame sizes,
//!   unaligned durations, out-of-range amplitudes, non-positive
//!   frequencies) is a [`SignalError`] raised before any audio is produced.
//! - **Exact framing**: all buffer sizes derive from the format's
//!   whole-sample frame arithmetic; there are no partial frames.
//!
//! ## Usage
//!
//! ```rust
//! use audioprobe_signal_core::{render_frame, Segment, SegmentPlan, StreamFormat};
//!
//! let format = StreamFormat::default(); // 16000Hz, 20ms frames
//! let plan = SegmentPlan::new(vec![
//!     Segment::silence(1000),
//!     Segment::tone(440.0, 0.5, 2000),
//!     Segment::silence(1000),
//! ]);
//! plan.validate(&format)?;
//!
//! assert_eq!(plan.total_frames(&format), 200);
//! let frame = render_frame(&format, &plan.segments()[1])?;
//! assert_eq!(frame.len(), format.frame_bytes());
//! # Ok::<(), audioprobe_signal_core::SignalError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod synth;
pub mod types;

pub use error::{Result, SignalError};
pub use synth::{render_frame, synthesize_silence, synthesize_tone};
pub use types::{
    Segment, SegmentKind, SegmentPlan, StreamFormat, DEFAULT_FRAME_MS, DEFAULT_SAMPLE_RATE,
};

/// Version information for the signal library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
