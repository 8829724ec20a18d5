//! Line-oriented chat client.
//!
//! ```text
//! REALTIME_WS_URL=ws://localhost:8765 cargo run --example chat_console -- Ana
//! ```
//!
//! Every stdin line is sent as a chat message; inbound traffic and connection changes are
//! printed as they arrive.

use kameo::Actor;
use realtime_ws::protocol::InboundMessage;
use realtime_ws::{
    ClientConfig, ClientEvent, ClientRole, OutboundMessage, SendOutbound, Start, Stop,
    StreamClientActor, StreamClientArgs,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "guest".to_string());
    let config = ClientConfig::from_env(ClientRole::Chat);
    println!("connecting to {} as {name}", config.server_url);

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let client = StreamClientActor::spawn(StreamClientArgs::new(config, events_tx));
    if let Err(err) = client.ask(Start).await {
        eprintln!("start failed: {err:?}");
        return;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let msg = match OutboundMessage::chat(&name, line) {
                    Ok(msg) => msg,
                    Err(err) => {
                        eprintln!("! {err}");
                        continue;
                    }
                };
                if let Err(err) = client.ask(SendOutbound(msg)).await {
                    eprintln!("! not sent: {err:?}");
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(event);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let _ = client.ask(Stop).await;
    let _ = client.stop_gracefully().await;
}

fn print_event(event: ClientEvent) {
    match event {
        ClientEvent::Message(InboundMessage::Chat(chat)) => println!("<{}> {}", chat.name, chat.text),
        ClientEvent::Message(InboundMessage::System(notice)) => match notice.online_count {
            Some(count) => println!("* {} ({count} online)", notice.text),
            None => println!("* {}", notice.text),
        },
        ClientEvent::Message(InboundMessage::Error(error)) => println!("! server: {}", error.text),
        ClientEvent::StateChanged { state, attempt } => println!("-- {state} (attempt {attempt})"),
        ClientEvent::ReconnectScheduled {
            attempt,
            max_attempts,
            delay,
        } => println!("-- reconnecting in {delay:?} ({attempt}/{max_attempts})"),
        ClientEvent::RecoveryExhausted { attempts } => {
            println!("-- gave up after {attempts} attempts; restart to try again")
        }
        ClientEvent::TransportError { error } => println!("! connection: {error}"),
        ClientEvent::TransportClosed { code, reason } => match code {
            Some(code) => println!("-- closed by server ({code}) {reason}"),
            None => println!("-- connection lost: {reason}"),
        },
        ClientEvent::DecodeError { error, .. } => println!("! bad frame: {error}"),
        _ => {}
    }
}
