mod support;

use std::collections::BTreeSet;

use kameo::error::SendError;
use realtime_ws::core::Sample;
use realtime_ws::protocol::InboundMessage;
use realtime_ws::{
    ClientConfig, ClientEvent, ConnectionState, GetSeriesRange, GetSeriesSnapshot,
    GetSubscriptions, Start, SubscriptionSync, UpdateSubscriptions, WebSocketError,
};
use support::{TIMEOUT, next_event, spawn_client, wait_for_event, wait_for_state};

fn metrics(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn telemetry_subscribes_on_open_and_records_metrics() {
    let (client, mut server, mut events) = spawn_client(ClientConfig::telemetry("ws://mock"));

    client.ask(Start).await.expect("start");
    let pending = server.next_connect_timeout(TIMEOUT).await.expect("connect");
    assert_eq!(pending.url(), "ws://mock/ws/dashboard");
    let mut conn = pending.accept();

    let handshake = conn.recv_text_timeout(TIMEOUT).await.expect("subscribe frame");
    assert_eq!(
        handshake,
        r#"{"type":"subscribe","metrics":["cpu","stock","temperature"]}"#
    );

    conn.send_text(r#"{"type":"metric","metric":"cpu","value":42.5,"ts":1000}"#)
        .unwrap();
    let recorded = wait_for_event(&mut events, |e| {
        matches!(e, ClientEvent::SampleRecorded { .. })
    })
    .await;
    assert_eq!(
        recorded,
        ClientEvent::SampleRecorded {
            series: "cpu".to_string(),
            snapshot: vec![Sample {
                value: 42.5,
                timestamp: 1000,
            }],
        }
    );

    // Unknown types are silent; malformed payloads surface exactly once.
    conn.send_text(r#"{"type":"ping"}"#).unwrap();
    conn.send_text("{broken").unwrap();
    match next_event(&mut events).await {
        ClientEvent::DecodeError { raw, .. } => assert_eq!(raw.as_ref(), b"{broken"),
        other => panic!("expected decode error, got {other:?}"),
    }
    // Binary frames go through the same decode path.
    conn.send_payload(vec![0xff, 0xfe]).unwrap();
    match next_event(&mut events).await {
        ClientEvent::DecodeError { raw, .. } => assert_eq!(raw.as_ref(), &[0xff, 0xfe]),
        other => panic!("expected decode error, got {other:?}"),
    }

    let snapshot = client
        .ask(GetSeriesSnapshot("cpu".to_string()))
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(
        client.ask(GetSeriesRange("cpu".to_string())).await.unwrap(),
        Some((42.5, 42.5))
    );
    assert_eq!(
        client.ask(GetSeriesRange("stock".to_string())).await.unwrap(),
        None
    );
    assert_eq!(client.ask(GetSubscriptions).await.unwrap(), metrics(&["cpu", "stock", "temperature"]));

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn system_and_error_messages_reach_observer() {
    let (client, mut server, mut events) = spawn_client(ClientConfig::chat("ws://mock"));

    client.ask(Start).await.expect("start");
    let conn = server.accept_next(TIMEOUT).await.expect("connect");
    wait_for_state(&client, ConnectionState::Open).await;

    conn.send_text(r#"{"type":"system","text":"An joined","online_count":2}"#)
        .unwrap();
    conn.send_text(r#"{"type":"error","text":"message too long"}"#)
        .unwrap();

    let system = wait_for_event(&mut events, |e| matches!(e, ClientEvent::Message(_))).await;
    let ClientEvent::Message(InboundMessage::System(notice)) = system else {
        panic!("expected system notice, got {system:?}");
    };
    assert_eq!(notice.online_count, Some(2));

    let ClientEvent::Message(InboundMessage::Error(error)) = next_event(&mut events).await else {
        panic!("expected server error");
    };
    assert_eq!(error.text, "message too long");

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn subscription_changes_are_deferred_until_open() {
    let config = ClientConfig::telemetry("ws://mock").with_retain_history_on_unsubscribe(false);
    let (client, mut server, mut events) = spawn_client(config);

    let sync = client
        .ask(UpdateSubscriptions(metrics(&["cpu"])))
        .await
        .unwrap();
    assert_eq!(sync, SubscriptionSync::Deferred);

    client.ask(Start).await.expect("start");
    let mut conn = server.accept_next(TIMEOUT).await.expect("connect");
    let handshake = conn.recv_text_timeout(TIMEOUT).await.expect("subscribe frame");
    assert_eq!(handshake, r#"{"type":"subscribe","metrics":["cpu"]}"#);

    conn.send_text(r#"{"type":"metric","metric":"cpu","value":3.0,"ts":1}"#)
        .unwrap();
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::SampleRecorded { .. })).await;

    let sync = client
        .ask(UpdateSubscriptions(metrics(&["stock"])))
        .await
        .unwrap();
    assert_eq!(sync, SubscriptionSync::Sent);
    let update = conn.recv_text_timeout(TIMEOUT).await.expect("update frame");
    assert_eq!(update, r#"{"type":"subscribe","metrics":["stock"]}"#);

    // History is dropped for series leaving the set when retention is off.
    let snapshot = client
        .ask(GetSeriesSnapshot("cpu".to_string()))
        .await
        .unwrap();
    assert!(snapshot.is_empty());

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn history_is_retained_after_unsubscribe_by_default() {
    let (client, mut server, mut events) = spawn_client(ClientConfig::telemetry("ws://mock"));

    client.ask(Start).await.expect("start");
    let mut conn = server.accept_next(TIMEOUT).await.expect("connect");
    conn.recv_text_timeout(TIMEOUT).await.expect("subscribe frame");

    conn.send_text(r#"{"type":"metric","metric":"stock","value":101.5,"ts":7}"#)
        .unwrap();
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::SampleRecorded { .. })).await;

    client
        .ask(UpdateSubscriptions(metrics(&["cpu"])))
        .await
        .unwrap();
    let snapshot = client
        .ask(GetSeriesSnapshot("stock".to_string()))
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);

    let _ = client.stop_gracefully().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn chat_clients_have_no_subscriptions() {
    let (client, _server, _events) = spawn_client(ClientConfig::chat("ws://mock"));

    let result = client.ask(UpdateSubscriptions(metrics(&["cpu"]))).await;
    assert!(matches!(
        result,
        Err(SendError::HandlerError(WebSocketError::InvalidState(_)))
    ));
    assert!(client.ask(GetSubscriptions).await.unwrap().is_empty());

    let _ = client.stop_gracefully().await;
}
