//! Error handling for signal synthesis and plan validation
//!
//! Every variant here is a configuration error: it is detected before a
//! single frame is sent, and it is fatal for the run. There are no
//! recoverable synthesis errors.

use thiserror::Error;

/// Result type alias for signal operations
pub type Result<T> = std::result::Result<T, SignalError>;

/// Configuration errors for stream formats, segments, and synthesis inputs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Sample rate is zero
    #[error("invalid sample rate: {rate}Hz")]
    InvalidSampleRate { rate: u32 },

    /// Frame duration is zero
    #[error("invalid frame duration: {frame_ms}ms")]
    InvalidFrameDuration { frame_ms: u32 },

    /// Sample rate and frame duration do not yield a whole number of samples
    #[error("fractional frame size: {sample_rate}Hz at {frame_ms}ms does not yield a whole sample count")]
    FractionalFrameSize { sample_rate: u32, frame_ms: u32 },

    /// Duration does not yield a whole number of samples at this sample rate
    #[error("fractional sample count: {duration_ms}ms at {sample_rate}Hz does not yield a whole sample count")]
    FractionalSampleCount { sample_rate: u32, duration_ms: u32 },

    /// Duration is zero
    #[error("invalid duration: {duration_ms}ms")]
    InvalidDuration { duration_ms: u32 },

    /// Duration is not a whole number of frames
    #[error("unaligned duration: {duration_ms}ms is not a multiple of the {frame_ms}ms frame duration")]
    UnalignedDuration { duration_ms: u32, frame_ms: u32 },

    /// Tone frequency is not positive and finite
    #[error("invalid frequency: {frequency}Hz (must be positive and finite)")]
    InvalidFrequency { frequency: f32 },

    /// Tone amplitude is outside [0.0, 1.0]
    #[error("invalid amplitude: {amplitude} (must be within 0.0..=1.0)")]
    InvalidAmplitude { amplitude: f32 },

    /// A segment inside a plan failed validation
    #[error("segment {index}: {source}")]
    Segment {
        index: usize,
        #[source]
        source: Box<SignalError>,
    },

    /// The plan has no segments at all
    #[error("segment plan contains no segments")]
    EmptyPlan,
}

impl SignalError {
    /// Wrap a segment-level error with the index of the offending segment
    pub fn in_segment(index: usize, source: SignalError) -> Self {
        Self::Segment {
            index,
            source: Box::new(source),
        }
    }
}
