//! Loopback tests for the WebSocket transport
//!
//! An in-process tokio-tungstenite server stands in for the service under
//! test: frames sent through `WsTransport` must arrive as binary messages
//! of the right size, server text comes back through the event channel,
//! and a server-initiated close is delivered as a `Closed` event that
//! makes further sends fail fast.

use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use audioprobe_stream_core::{Error, Transport, TransportEvent, WsConfig, WsTransport};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Binds a loopback server that records binary message sizes, answers the
/// last expected frame with a text event, and exits on the client's close.
async fn spawn_echo_server(expected_frames: usize) -> (String, JoinHandle<Vec<usize>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut sizes = Vec::new();

        while let Some(msg) = ws.next().await {
            match msg.unwrap() {
                Message::Binary(data) => {
                    sizes.push(data.len());
                    if sizes.len() == expected_frames {
                        ws.send(Message::Text(
                            r#"{"event": "vad_start", "prob": 0.93}"#.to_string(),
                        ))
                        .await
                        .unwrap();
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        sizes
    });

    (format!("ws://{}", addr), handle)
}

#[tokio::test]
async fn frames_round_trip_as_binary_messages() {
    init_logging();
    let (url, server) = spawn_echo_server(3).await;
    let (transport, mut events) = WsTransport::connect(&url, WsConfig::default())
        .await
        .unwrap();

    let frame = Bytes::from(vec![0u8; 640]);
    for _ in 0..3 {
        transport.send_frame(frame.clone()).await.unwrap();
    }

    // The server's text reply comes back through the event channel
    let event = timeout(RECV_TIMEOUT, events.recv()).await.unwrap().unwrap();
    match event {
        TransportEvent::MessageReceived { text } => {
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value["event"], "vad_start");
        }
        other => panic!("expected a message event, got {:?}", other),
    }

    transport.close().await.unwrap();
    assert!(transport.is_closed());

    let sizes = timeout(RECV_TIMEOUT, server).await.unwrap().unwrap();
    assert_eq!(sizes, vec![640, 640, 640]);

    // The receive loop always terminates the channel with a Closed event
    let event = timeout(RECV_TIMEOUT, events.recv()).await.unwrap().unwrap();
    assert!(matches!(event, TransportEvent::Closed { .. }));
}

#[tokio::test]
async fn server_close_stops_further_sends() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "done".into(),
        }))
        .await
        .unwrap();
        // Drive the close handshake to completion
        while let Some(Ok(_)) = ws.next().await {}
    });

    let (transport, mut events) = WsTransport::connect(&url, WsConfig::default())
        .await
        .unwrap();

    let event = timeout(RECV_TIMEOUT, events.recv()).await.unwrap().unwrap();
    assert_eq!(
        event,
        TransportEvent::Closed {
            code: Some(1000),
            reason: "done".to_string(),
        }
    );
    assert!(transport.is_closed());

    let err = transport
        .send_frame(Bytes::from(vec![0u8; 640]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransportClosed));

    timeout(RECV_TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn connect_failure_is_surfaced() {
    init_logging();
    // Nothing is listening here
    let err = WsTransport::connect("ws://127.0.0.1:1", WsConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConnectFailed { .. }));
}
