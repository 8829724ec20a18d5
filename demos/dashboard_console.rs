//! Telemetry dashboard printed to the terminal.
//!
//! ```text
//! REALTIME_WS_URL=ws://localhost:8765 cargo run --example dashboard_console -- cpu stock
//! ```
//!
//! Metric names given on the command line replace the default subscription set. Each
//! sample prints the latest value with the min/max of the rolling window as reported by
//! the client.

use kameo::Actor;
use realtime_ws::core::Sample;
use realtime_ws::protocol::InboundMessage;
use realtime_ws::{
    ClientConfig, ClientEvent, ClientRole, GetSeriesRange, Start, Stop, StreamClientActor,
    StreamClientArgs,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env(ClientRole::Telemetry);
    println!("connecting to {}", config.server_url);

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let mut args = StreamClientArgs::new(config, events_tx);
    let metrics: Vec<String> = std::env::args().skip(1).collect();
    if !metrics.is_empty() {
        args = args.subscriptions(metrics);
    }
    let client = StreamClientActor::spawn(args);
    if let Err(err) = client.ask(Start).await {
        eprintln!("start failed: {err:?}");
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if let ClientEvent::SampleRecorded { series, snapshot } = &event {
                    let range = client.ask(GetSeriesRange(series.clone())).await;
                    print_sample(series, snapshot, range.ok().flatten());
                } else {
                    print_event(event);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let _ = client.ask(Stop).await;
    let _ = client.stop_gracefully().await;
}

fn print_sample(series: &str, snapshot: &[Sample], range: Option<(f64, f64)>) {
    let (Some(latest), Some((min, max))) = (snapshot.last(), range) else {
        return;
    };
    println!(
        "{series:<12} {:>10.2}  min {min:>10.2}  max {max:>10.2}  n={}",
        latest.value,
        snapshot.len()
    );
}

fn print_event(event: ClientEvent) {
    match event {
        ClientEvent::Message(InboundMessage::Error(error)) => println!("! server: {}", error.text),
        ClientEvent::StateChanged { state, attempt } => println!("-- {state} (attempt {attempt})"),
        ClientEvent::ReconnectScheduled {
            attempt,
            max_attempts,
            delay,
        } => println!("-- reconnecting in {delay:?} ({attempt}/{max_attempts})"),
        ClientEvent::RecoveryExhausted { attempts } => {
            println!("-- gave up after {attempts} attempts")
        }
        ClientEvent::TransportError { error } => println!("! connection: {error}"),
        ClientEvent::DecodeError { error, .. } => println!("! bad frame: {error}"),
        _ => {}
    }
}
