mod support;

use std::time::Duration;

use kameo::error::SendError;
use realtime_ws::core::WsFrame;
use realtime_ws::{
    BackoffPolicy, ClientConfig, ClientEvent, ConnectionState, GetConnectionState,
    OutboundMessage, Restart, SendOutbound, Start, Stop, WebSocketError,
};
use support::{
    TIMEOUT, next_event, next_reconnect, spawn_client, wait_for_event, wait_for_state,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sends_are_rejected_unless_open() {
    let config = ClientConfig::chat("ws://mock")
        .with_backoff(BackoffPolicy::new(Duration::from_millis(500), 5));
    let (client, mut server, _events) = spawn_client(config);
    let chat = OutboundMessage::chat("An", "hello").unwrap();

    let result = client.ask(SendOutbound(chat.clone())).await;
    assert!(matches!(
        result,
        Err(SendError::HandlerError(WebSocketError::NotOpen {
            state: ConnectionState::Idle
        }))
    ));

    client.ask(Start).await.expect("start");
    let pending = server.next_connect_timeout(TIMEOUT).await.expect("connect");
    let result = client.ask(SendOutbound(chat.clone())).await;
    assert!(matches!(
        result,
        Err(SendError::HandlerError(WebSocketError::NotOpen {
            state: ConnectionState::Connecting
        }))
    ));

    let mut conn = pending.accept();
    wait_for_state(&client, ConnectionState::Open).await;
    client
        .ask(SendOutbound(chat.clone()))
        .await
        .expect("send while open");
    let line = conn.recv_text_timeout(TIMEOUT).await.expect("chat frame");
    assert!(line.starts_with(r#"{"type":"chat","name":"An","text":"hello","ts":"#));

    conn.drop_socket();
    wait_for_state(&client, ConnectionState::Closed).await;
    let result = client.ask(SendOutbound(chat)).await;
    assert!(matches!(
        result,
        Err(SendError::HandlerError(WebSocketError::NotOpen {
            state: ConnectionState::Closed
        }))
    ));
    // Rejected sends never reach the transport.
    assert!(
        conn.recv_outbound_timeout(Duration::from_millis(100))
            .await
            .is_none()
    );

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_cancels_pending_reconnect() {
    let config = ClientConfig::chat("ws://mock")
        .with_backoff(BackoffPolicy::new(Duration::from_millis(100), 5));
    let (client, mut server, mut events) = spawn_client(config);

    client.ask(Start).await.expect("start");
    let mut conn = server.accept_next(TIMEOUT).await.expect("connect");
    wait_for_state(&client, ConnectionState::Open).await;
    conn.drop_socket();
    assert_eq!(next_reconnect(&mut events).await, (1, Duration::from_millis(100)));

    client.ask(Stop).await.expect("stop");
    assert!(
        server
            .next_connect_timeout(Duration::from_millis(400))
            .await
            .is_none(),
        "cancelled timer must not reconnect"
    );
    let snapshot = client.ask(GetConnectionState).await.unwrap();
    assert_eq!(snapshot.state, ConnectionState::Idle);
    assert_eq!(snapshot.attempt, 0);
    assert!(!snapshot.reconnect_pending);

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_while_open_sends_close_frame() {
    let (client, mut server, _events) = spawn_client(ClientConfig::chat("ws://mock"));

    client.ask(Start).await.expect("start");
    let mut conn = server.accept_next(TIMEOUT).await.expect("connect");
    wait_for_state(&client, ConnectionState::Open).await;

    client.ask(Stop).await.expect("stop");
    let frame = conn.recv_outbound_timeout(TIMEOUT).await.expect("close frame");
    let WsFrame::Close(Some(close)) = frame else {
        panic!("expected close frame, got {frame:?}");
    };
    assert_eq!(close.code, 1000);
    wait_for_state(&client, ConnectionState::Idle).await;

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn start_is_single_flight() {
    let (client, mut server, _events) = spawn_client(ClientConfig::chat("ws://mock"));

    client.ask(Start).await.expect("start");
    client.ask(Start).await.expect("second start");
    let _pending = server.next_connect_timeout(TIMEOUT).await.expect("connect");
    assert!(
        server
            .next_connect_timeout(Duration::from_millis(100))
            .await
            .is_none()
    );

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn superseded_connect_is_dropped() {
    let (client, mut server, _events) = spawn_client(ClientConfig::chat("ws://mock"));

    client.ask(Start).await.expect("start");
    let stale = server.next_connect_timeout(TIMEOUT).await.expect("first connect");
    client.ask(Restart).await.expect("restart");
    let fresh = server.next_connect_timeout(TIMEOUT).await.expect("second connect");

    let _stale_conn = stale.accept();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = client.ask(GetConnectionState).await.unwrap();
    assert_eq!(snapshot.state, ConnectionState::Connecting);

    let _conn = fresh.accept();
    wait_for_state(&client, ConnectionState::Open).await;

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn read_error_is_reported_before_the_close_drives_recovery() {
    let config = ClientConfig::chat("ws://mock")
        .with_backoff(BackoffPolicy::new(Duration::from_millis(50), 5));
    let (client, mut server, mut events) = spawn_client(config);

    client.ask(Start).await.expect("start");
    let conn = server.accept_next(TIMEOUT).await.expect("connect");
    wait_for_state(&client, ConnectionState::Open).await;
    wait_for_event(&mut events, |e| {
        matches!(
            e,
            ClientEvent::StateChanged {
                state: ConnectionState::Open,
                ..
            }
        )
    })
    .await;

    conn.inject_error("connection reset by peer").unwrap();

    // The error alone changes nothing; the state only moves once the close arrives.
    match next_event(&mut events).await {
        ClientEvent::TransportError { error } => {
            assert!(error.contains("connection reset by peer"), "unexpected error {error}")
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(matches!(
        next_event(&mut events).await,
        ClientEvent::TransportClosed { code: None, .. }
    ));
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::StateChanged {
            state: ConnectionState::Closed,
            attempt: 1,
        }
    );
    assert_eq!(next_reconnect(&mut events).await, (1, Duration::from_millis(50)));

    let _conn = server.accept_next(TIMEOUT).await.expect("reconnect");
    wait_for_state(&client, ConnectionState::Open).await;

    let _ = client.stop_gracefully().await;
}
