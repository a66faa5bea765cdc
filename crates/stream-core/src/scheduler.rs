//! Real-time paced frame emission
//!
//! The scheduler realizes a [`SegmentPlan`] as a sequence of `send_frame`
//! calls at a fixed cadence. Pacing uses [`tokio::time::interval`], which
//! ticks against absolute deadlines: frame N is sent no earlier than
//! `start + N * frame_duration`, and send latency never accumulates into
//! drift the way a constant post-send sleep would. Each segment's frame
//! buffer is rendered exactly once and cloned per send, so every frame in a
//! segment is byte-identical by construction.

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

use audioprobe_signal_core::{render_frame, SegmentPlan, StreamFormat};

use crate::error::Result;
use crate::transport::Transport;

/// Paced sender for one segment plan
///
/// Borrows the transport; it owns the send path only while `run` is in
/// flight. `frames_sent` stays valid after an aborted run, so callers can
/// report how far a failed stream got.
pub struct FrameScheduler<'a> {
    transport: &'a dyn Transport,
    format: StreamFormat,
    frames_sent: u64,
}

impl<'a> FrameScheduler<'a> {
    /// Create a scheduler for a transport and stream format
    pub fn new(transport: &'a dyn Transport, format: StreamFormat) -> Self {
        Self {
            transport,
            format,
            frames_sent: 0,
        }
    }

    /// Stream the plan, one frame per tick, in segment order
    ///
    /// Validates the plan first so configuration errors surface before any
    /// frame is sent. A send failure aborts immediately; the plan is never
    /// resumed.
    pub async fn run(&mut self, plan: &SegmentPlan) -> Result<()> {
        plan.validate(&self.format)?;

        let mut ticker = interval(self.format.frame_duration());
        // Catch up after a late tick without shifting later deadlines
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        for (index, segment) in plan.segments().iter().enumerate() {
            let frame_count = segment.frame_count(&self.format);
            let buffer = render_frame(&self.format, segment)?;
            debug!("segment {}: {} ({} frames)", index, segment, frame_count);

            for _ in 0..frame_count {
                ticker.tick().await;
                if let Err(e) = self.transport.send_frame(buffer.clone()).await {
                    error!("send failed after {} frames: {}", self.frames_sent, e);
                    return Err(e);
                }
                self.frames_sent += 1;
            }
        }

        Ok(())
    }

    /// Frames sent so far (accurate after both completed and aborted runs)
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}
