//! audioprobe: stream a deterministic PCM scenario at a WebSocket service
//!
//! Plays one segment plan (silence, tone, silence by default, or a JSON
//! plan file) against a target URL at real-time cadence, logs whatever the
//! service sends back, and exits once the connection is closed.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use audioprobe_signal_core::{
    Segment, SegmentPlan, StreamFormat, DEFAULT_FRAME_MS, DEFAULT_SAMPLE_RATE,
};
use audioprobe_stream_core::{DriverConfig, StreamDriver, WsConfig, WsTransport};

#[derive(Parser, Debug)]
#[command(name = "audioprobe", version, about = "Synthetic real-time audio stream probe")]
struct Args {
    /// WebSocket URL of the service under test
    #[arg(long, env = "AUDIOPROBE_URL", default_value = "ws://127.0.0.1:8989/ws")]
    url: String,

    /// Sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Frame duration in milliseconds
    #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
    frame_ms: u32,

    /// Leading silence in milliseconds
    #[arg(long, default_value_t = 1000)]
    lead_silence_ms: u32,

    /// Tone duration in milliseconds
    #[arg(long, default_value_t = 2000)]
    tone_ms: u32,

    /// Tone frequency in Hz
    #[arg(long, default_value_t = 440.0)]
    frequency: f32,

    /// Tone amplitude as a fraction of full scale, in [0, 1]
    #[arg(long, default_value_t = 0.5)]
    amplitude: f32,

    /// Trailing silence in milliseconds
    #[arg(long, default_value_t = 1000)]
    tail_silence_ms: u32,

    /// JSON plan file; overrides the silence/tone/silence flags
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Grace period after the last frame, in milliseconds
    #[arg(long, default_value_t = 1000)]
    drain_ms: u64,

    /// WebSocket handshake timeout, in seconds
    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Log every outbound frame at trace level
    #[arg(long)]
    trace_frames: bool,
}

fn load_plan(args: &Args) -> anyhow::Result<SegmentPlan> {
    if let Some(path) = &args.plan {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading plan file {}", path.display()))?;
        let plan = serde_json::from_str(&contents)
            .with_context(|| format!("parsing plan file {}", path.display()))?;
        return Ok(plan);
    }

    Ok(SegmentPlan::new(vec![
        Segment::silence(args.lead_silence_ms),
        Segment::tone(args.frequency, args.amplitude, args.tone_ms),
        Segment::silence(args.tail_silence_ms),
    ]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let format = StreamFormat::new(args.sample_rate, args.frame_ms);
    let plan = load_plan(&args)?;
    plan.validate(&format)
        .context("invalid scenario configuration")?;
    info!(
        "scenario: {} segments, {} frames, {}ms total at {}",
        plan.len(),
        plan.total_frames(&format),
        plan.total_duration_ms(),
        format
    );

    let ws_config = WsConfig {
        connect_timeout: Duration::from_secs(args.connect_timeout_secs),
        trace_frames: args.trace_frames,
        ..Default::default()
    };
    let (transport, events) = WsTransport::connect(&args.url, ws_config)
        .await
        .with_context(|| format!("connecting to {}", args.url))?;

    let config = DriverConfig {
        format,
        drain_delay: Duration::from_millis(args.drain_ms),
    };
    let mut driver = StreamDriver::new(transport, config);
    let stats = driver.run(&plan, events).await?;

    info!(
        "done: {} frames / {} bytes in {:.2?}, {} inbound messages",
        stats.frames_sent, stats.bytes_sent, stats.elapsed, stats.messages_received
    );
    Ok(())
}
