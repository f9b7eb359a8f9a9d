//! Timeout, cancellation and transport failures against raw TCP endpoints.

use echo_tts_client::{ApiVersion, CancellationToken, Error, SynthesisRequest, TtsClient};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

/// Accepts connections and never answers. Returns the address and an accept counter.
async fn silent_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });
    (addr, accepted)
}

fn client_for(addr: SocketAddr, timeout: Duration) -> TtsClient {
    TtsClient::builder()
        .base_url(format!("http://{}", addr))
        .api_key("test-key")
        .api_version(ApiVersion::VoiceId)
        .timeout(timeout)
        .build()
        .unwrap()
}

fn request() -> SynthesisRequest {
    SynthesisRequest::new("Hello").with_voice_id("alice")
}

#[tokio::test]
async fn silent_server_times_out_after_one_attempt() {
    let (addr, accepted) = silent_server().await;
    let client = client_for(addr, Duration::from_millis(300));

    let start = Instant::now();
    let err = client.synthesize(&request()).await.unwrap_err();
    assert!(
        matches!(err, Error::Timeout { timeout } if timeout == Duration::from_millis(300)),
        "{err:?}"
    );
    assert!(start.elapsed() < Duration::from_secs(5));

    // Give a retry, if any, a chance to show up.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancellation_stops_waiting() {
    let (addr, _accepted) = silent_server().await;
    let client = client_for(addr, Duration::from_secs(30));
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = client
        .synthesize_with_cancel(&request(), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled), "{err:?}");
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn cancelled_token_sends_nothing() {
    let (addr, accepted) = silent_server().await;
    let client = client_for(addr, Duration::from_secs(30));
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .synthesize_with_cancel(&request(), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_request_wins_over_cancellation() {
    let (addr, _accepted) = silent_server().await;
    let client = client_for(addr, Duration::from_secs(30));
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .synthesize_with_cancel(&SynthesisRequest::new("   ").with_voice_id("alice"), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { .. }));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, Duration::from_secs(5));
    let err = client.synthesize(&request()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{err:?}");
    assert!(!err.is_local());
}
