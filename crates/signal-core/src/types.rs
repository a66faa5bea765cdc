//! Stream format and segment-plan data model
//!
//! A [`StreamFormat`] fixes the sample rate and frame duration for a whole
//! run; a [`SegmentPlan`] is the ordered scenario script realized against
//! that format. Both are plain data: construction never fails, and
//! `validate()` is called once before streaming begins so that every
//! configuration error is raised before the first frame is sent.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Default frame duration in milliseconds
pub const DEFAULT_FRAME_MS: u32 = 20;

/// Fixed per-run audio format: sample rate plus frame duration
///
/// All frame and buffer sizes are derived from this pair. The pair is only
/// usable when it yields a whole number of samples per frame; anything else
/// is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFormat {
    /// Samples per second
    pub sample_rate: u32,
    /// Milliseconds of audio per frame
    pub frame_ms: u32,
}

impl StreamFormat {
    /// Create a new format (validation is separate, see [`StreamFormat::validate`])
    pub const fn new(sample_rate: u32, frame_ms: u32) -> Self {
        Self {
            sample_rate,
            frame_ms,
        }
    }

    /// Check that the format is usable: positive rate and duration, and a
    /// whole number of samples per frame
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SignalError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if self.frame_ms == 0 {
            return Err(SignalError::InvalidFrameDuration {
                frame_ms: self.frame_ms,
            });
        }
        if (self.sample_rate as u64 * self.frame_ms as u64) % 1000 != 0 {
            return Err(SignalError::FractionalFrameSize {
                sample_rate: self.sample_rate,
                frame_ms: self.frame_ms,
            });
        }
        Ok(())
    }

    /// Samples in one frame (320 at the 16000Hz/20ms defaults)
    pub fn frame_samples(&self) -> usize {
        (self.sample_rate as u64 * self.frame_ms as u64 / 1000) as usize
    }

    /// Bytes in one encoded frame: two bytes per 16-bit sample
    pub fn frame_bytes(&self) -> usize {
        self.frame_samples() * 2
    }

    /// Frame duration as a [`Duration`]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_ms as u64)
    }

    /// Samples for an arbitrary duration at this sample rate
    ///
    /// Returns an error when the duration does not map to a whole sample
    /// count; callers that validated against the frame grid never hit this.
    pub fn samples_for(&self, duration_ms: u32) -> Result<usize> {
        let total = self.sample_rate as u64 * duration_ms as u64;
        if total % 1000 != 0 {
            return Err(SignalError::FractionalSampleCount {
                sample_rate: self.sample_rate,
                duration_ms,
            });
        }
        Ok((total / 1000) as usize)
    }
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_MS)
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz/{}ms", self.sample_rate, self.frame_ms)
    }
}

/// What a segment sounds like: silence, or a single steady tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Zero-valued samples
    Silence,
    /// A sine tone at a fixed frequency and amplitude
    Tone {
        /// Tone frequency in Hz
        frequency: f32,
        /// Peak amplitude as a fraction of full scale, in [0.0, 1.0]
        amplitude: f32,
    },
}

/// A contiguous run of identical frames on the scenario timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Synthesis kind for every frame in the segment
    #[serde(flatten)]
    pub kind: SegmentKind,
    /// Total segment duration; must be a whole number of frames
    pub duration_ms: u32,
}

impl Segment {
    /// A silent segment
    pub const fn silence(duration_ms: u32) -> Self {
        Self {
            kind: SegmentKind::Silence,
            duration_ms,
        }
    }

    /// A tone segment
    pub const fn tone(frequency: f32, amplitude: f32, duration_ms: u32) -> Self {
        Self {
            kind: SegmentKind::Tone {
                frequency,
                amplitude,
            },
            duration_ms,
        }
    }

    /// Validate this segment against a format
    pub fn validate(&self, format: &StreamFormat) -> Result<()> {
        if self.duration_ms == 0 {
            return Err(SignalError::InvalidDuration {
                duration_ms: self.duration_ms,
            });
        }
        if self.duration_ms % format.frame_ms != 0 {
            return Err(SignalError::UnalignedDuration {
                duration_ms: self.duration_ms,
                frame_ms: format.frame_ms,
            });
        }
        if let SegmentKind::Tone {
            frequency,
            amplitude,
        } = self.kind
        {
            if !frequency.is_finite() || frequency <= 0.0 {
                return Err(SignalError::InvalidFrequency { frequency });
            }
            if !amplitude.is_finite() || !(0.0..=1.0).contains(&amplitude) {
                return Err(SignalError::InvalidAmplitude { amplitude });
            }
        }
        Ok(())
    }

    /// Number of whole frames in this segment
    pub fn frame_count(&self, format: &StreamFormat) -> u64 {
        (self.duration_ms / format.frame_ms) as u64
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SegmentKind::Silence => write!(f, "silence {}ms", self.duration_ms),
            SegmentKind::Tone {
                frequency,
                amplitude,
            } => write!(
                f,
                "tone {}Hz amp {} {}ms",
                frequency, amplitude, self.duration_ms
            ),
        }
    }
}

/// The ordered scenario script for a whole run
///
/// Ordering is significant and fixed at construction; playback never
/// mutates the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentPlan {
    segments: Vec<Segment>,
}

impl SegmentPlan {
    /// Build a plan from segments in timeline order
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Validate the whole plan against a format
    ///
    /// The format itself is validated first, then each segment; segment
    /// errors carry the index of the offending segment.
    pub fn validate(&self, format: &StreamFormat) -> Result<()> {
        format.validate()?;
        if self.segments.is_empty() {
            return Err(SignalError::EmptyPlan);
        }
        for (index, segment) in self.segments.iter().enumerate() {
            segment
                .validate(format)
                .map_err(|e| SignalError::in_segment(index, e))?;
        }
        Ok(())
    }

    /// Segments in timeline order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the plan is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total planned duration in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_ms as u64).sum()
    }

    /// Total number of frames the plan will emit under a format
    pub fn total_frames(&self, format: &StreamFormat) -> u64 {
        self.segments.iter().map(|s| s.frame_count(format)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_frame_size() {
        let format = StreamFormat::default();
        assert!(format.validate().is_ok());
        assert_eq!(format.frame_samples(), 320);
        assert_eq!(format.frame_bytes(), 640);
        assert_eq!(format.frame_duration(), Duration::from_millis(20));
    }

    #[test]
    fn test_fractional_frame_size_rejected() {
        // 11025Hz * 20ms = 220.5 samples
        let format = StreamFormat::new(11_025, 20);
        assert_eq!(
            format.validate(),
            Err(SignalError::FractionalFrameSize {
                sample_rate: 11_025,
                frame_ms: 20,
            })
        );
    }

    #[test]
    fn test_zero_rate_and_frame_rejected() {
        assert!(matches!(
            StreamFormat::new(0, 20).validate(),
            Err(SignalError::InvalidSampleRate { .. })
        ));
        assert!(matches!(
            StreamFormat::new(16_000, 0).validate(),
            Err(SignalError::InvalidFrameDuration { .. })
        ));
    }

    #[test]
    fn test_unaligned_segment_duration() {
        let format = StreamFormat::default();
        let segment = Segment::silence(1005);
        assert_eq!(
            segment.validate(&format),
            Err(SignalError::UnalignedDuration {
                duration_ms: 1005,
                frame_ms: 20,
            })
        );
    }

    #[test]
    fn test_tone_parameter_validation() {
        let format = StreamFormat::default();
        assert!(matches!(
            Segment::tone(440.0, 1.5, 1000).validate(&format),
            Err(SignalError::InvalidAmplitude { .. })
        ));
        assert!(matches!(
            Segment::tone(440.0, -0.1, 1000).validate(&format),
            Err(SignalError::InvalidAmplitude { .. })
        ));
        assert!(matches!(
            Segment::tone(0.0, 0.5, 1000).validate(&format),
            Err(SignalError::InvalidFrequency { .. })
        ));
        assert!(matches!(
            Segment::tone(f32::NAN, 0.5, 1000).validate(&format),
            Err(SignalError::InvalidFrequency { .. })
        ));
        assert!(Segment::tone(440.0, 0.5, 1000).validate(&format).is_ok());
        assert!(Segment::tone(440.0, 0.0, 1000).validate(&format).is_ok());
        assert!(Segment::tone(440.0, 1.0, 1000).validate(&format).is_ok());
    }

    #[test]
    fn test_plan_totals() {
        let format = StreamFormat::default();
        let plan = SegmentPlan::new(vec![
            Segment::silence(1000),
            Segment::tone(440.0, 0.5, 2000),
            Segment::silence(1000),
        ]);
        assert!(plan.validate(&format).is_ok());
        assert_eq!(plan.total_frames(&format), 200);
        assert_eq!(plan.total_duration_ms(), 4000);
    }

    #[test]
    fn test_plan_error_carries_segment_index() {
        let format = StreamFormat::default();
        let plan = SegmentPlan::new(vec![
            Segment::silence(1000),
            Segment::tone(440.0, 0.5, 1005),
        ]);
        let err = plan.validate(&format).unwrap_err();
        assert!(matches!(err, SignalError::Segment { index: 1, .. }));
    }

    #[test]
    fn test_empty_plan_rejected() {
        let format = StreamFormat::default();
        let plan = SegmentPlan::new(vec![]);
        assert_eq!(plan.validate(&format), Err(SignalError::EmptyPlan));
    }

    #[test]
    fn test_plan_from_json() {
        let json = r#"[
            {"kind": "silence", "duration_ms": 1000},
            {"kind": "tone", "frequency": 440.0, "amplitude": 0.5, "duration_ms": 2000},
            {"kind": "silence", "duration_ms": 1000}
        ]"#;
        let plan: SegmentPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.segments()[1],
            Segment::tone(440.0, 0.5, 2000)
        );
        assert!(plan.validate(&StreamFormat::default()).is_ok());
    }
}
