//! Client connection to the relay server.
//!
//! The socket runs on its own thread with a small tokio runtime. The game
//! loop talks to it through two unbounded channels and never blocks on the
//! network.

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerEvent};
use std::thread;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Server(ServerEvent),
    /// The connection is gone. Carries the failure, if there was one.
    Closed(Option<String>),
}

pub struct NetworkHandle {
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    incoming: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl NetworkHandle {
    /// Starts connecting to `url` in the background.
    pub fn spawn(url: &str) -> Result<Self, NetworkError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming) = mpsc::unbounded_channel();
        let url = url.to_string();

        thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let reason = match run_connection(&url, outgoing_rx, &incoming_tx).await {
                        Ok(()) => None,
                        Err(e) => {
                            error!("Connection to {} failed: {}", url, e);
                            Some(e.to_string())
                        }
                    };
                    let _ = incoming_tx.send(NetworkEvent::Closed(reason));
                });
            })?;

        Ok(Self { outgoing, incoming })
    }

    /// Queues a message. Returns false once the connection is gone.
    pub fn send(&self, message: ClientMessage) -> bool {
        self.outgoing.send(message).is_ok()
    }

    /// Drains every event received since the last call.
    pub fn poll(&mut self) -> Vec<NetworkEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.incoming.try_recv() {
            events.push(event);
        }
        events
    }
}

async fn run_connection(
    url: &str,
    mut outgoing: mpsc::UnboundedReceiver<ClientMessage>,
    incoming: &mpsc::UnboundedSender<NetworkEvent>,
) -> Result<(), NetworkError> {
    info!("Connecting to server at {}...", url);
    let (socket, _) = connect_async(url).await?;
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            message = outgoing.recv() => {
                let Some(message) = message else {
                    // The game loop dropped its handle.
                    sink.close().await?;
                    return Ok(());
                };
                match message.encode() {
                    Ok(text) => sink.send(Message::Text(text)).await?,
                    Err(e) => warn!("Failed to encode message: {}", e),
                }
            },

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match ServerEvent::decode(&text) {
                        Ok(event) => {
                            if incoming.send(NetworkEvent::Server(event)).is_err() {
                                return Ok(());
                            }
                        }
                        Err(e) => warn!("Dropping server frame: {}", e),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Server closed the connection");
                        return Ok(());
                    }
                    Some(Ok(_)) => debug!("Ignoring non-text frame"),
                    Some(Err(e)) => return Err(e.into()),
                }
            },
        }
    }
}
