#![allow(dead_code)]

use std::time::{Duration, Instant};

use kameo::prelude::{Actor, ActorRef};
use realtime_ws::testing::{MockServer, MockTransport};
use realtime_ws::{
    ClientConfig, ClientEvent, ConnectionState, GetConnectionState, StreamClientActor,
    StreamClientArgs,
};
use tokio::sync::mpsc;

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub type TestClient = StreamClientActor<mpsc::UnboundedSender<ClientEvent>, MockTransport>;
pub type TestClientRef = ActorRef<TestClient>;

pub fn spawn_client(
    config: ClientConfig,
) -> (
    TestClientRef,
    MockServer,
    mpsc::UnboundedReceiver<ClientEvent>,
) {
    let (transport, server) = MockTransport::channel_pair();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let client = StreamClientActor::spawn(StreamClientArgs::with_transport(
        config, transport, events_tx,
    ));
    (client, server, events_rx)
}

pub async fn wait_for_state(client: &TestClientRef, state: ConnectionState) {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        let snapshot = client
            .ask(GetConnectionState)
            .await
            .expect("get connection state");
        if snapshot.state == state {
            return;
        }
        if Instant::now() > deadline {
            panic!("timed out waiting for {state}, last seen {}", snapshot.state);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for client event")
        .expect("event channel closed")
}

/// Skip events until one satisfies `pred`.
pub async fn wait_for_event(
    events: &mut mpsc::UnboundedReceiver<ClientEvent>,
    pred: impl Fn(&ClientEvent) -> bool,
) -> ClientEvent {
    loop {
        let event = next_event(events).await;
        if pred(&event) {
            return event;
        }
    }
}

/// Next scheduled reconnect as `(attempt, delay)`.
pub async fn next_reconnect(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> (u32, Duration) {
    match wait_for_event(events, |e| matches!(e, ClientEvent::ReconnectScheduled { .. })).await {
        ClientEvent::ReconnectScheduled { attempt, delay, .. } => (attempt, delay),
        _ => unreachable!(),
    }
}
