//! Deterministic PCM synthesis
//!
//! Maps a synthesis spec to signed 16-bit little-endian PCM bytes. Output
//! depends only on the arguments: there is no state between calls and no
//! randomness, so identical inputs always produce byte-identical buffers.
//! All numeric validation happens up front and fails fast with a
//! [`SignalError`]; nothing errors mid-buffer.

use std::f32::consts::PI;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, SignalError};
use crate::types::{Segment, SegmentKind, StreamFormat};

/// Full-scale factor for signed 16-bit samples
const FULL_SCALE: f32 = 32767.0;

/// Synthesize a sine tone as PCM16-LE bytes
///
/// Sample `i` has the value
/// `round(32767 * amplitude * sin(2π * frequency * i / sample_rate))`,
/// clamped to the `i16` range. The duration must map to a whole number of
/// samples at the format's rate.
pub fn synthesize_tone(
    format: &StreamFormat,
    frequency: f32,
    duration_ms: u32,
    amplitude: f32,
) -> Result<Bytes> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(SignalError::InvalidFrequency { frequency });
    }
    if !amplitude.is_finite() || !(0.0..=1.0).contains(&amplitude) {
        return Err(SignalError::InvalidAmplitude { amplitude });
    }
    let num_samples = checked_samples(format, duration_ms)?;

    let mut buf = BytesMut::with_capacity(num_samples * 2);
    let scale = FULL_SCALE * amplitude;
    for i in 0..num_samples {
        let t = i as f32 / format.sample_rate as f32;
        let value = scale * (2.0 * PI * frequency * t).sin();
        buf.put_i16_le(value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16);
    }
    Ok(buf.freeze())
}

/// Synthesize silence: a zeroed PCM16-LE buffer of the same length a tone
/// of the same duration would have
pub fn synthesize_silence(format: &StreamFormat, duration_ms: u32) -> Result<Bytes> {
    let num_samples = checked_samples(format, duration_ms)?;
    Ok(BytesMut::zeroed(num_samples * 2).freeze())
}

/// Render one frame's worth of audio for a segment
///
/// Every frame within a segment is identical, so callers synthesize once
/// per segment and clone the returned buffer per send.
pub fn render_frame(format: &StreamFormat, segment: &Segment) -> Result<Bytes> {
    match segment.kind {
        SegmentKind::Silence => synthesize_silence(format, format.frame_ms),
        SegmentKind::Tone {
            frequency,
            amplitude,
        } => synthesize_tone(format, frequency, format.frame_ms, amplitude),
    }
}

fn checked_samples(format: &StreamFormat, duration_ms: u32) -> Result<usize> {
    if duration_ms == 0 {
        return Err(SignalError::InvalidDuration { duration_ms });
    }
    format.samples_for(duration_ms)
}
