//! Server network layer handling WebSocket connections and the relay loop

use crate::relay::{Outbound, Relay, Target};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientMessage, PlayerId, ProtocolError};
use std::collections::HashMap;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// Pause after a failed accept before polling the listener again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    Connected {
        id: PlayerId,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<Message>,
    },
    Frame {
        id: PlayerId,
        text: String,
    },
    Disconnected {
        id: PlayerId,
    },
}

/// Main server: accepts connections and runs every relay operation on a
/// single task, one message at a time.
pub struct Server {
    listener: TcpListener,
    relay: Relay,
    connections: HashMap<PlayerId, mpsc::UnboundedSender<Message>>,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn bind(addr: &str) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            relay: Relay::new(),
            connections: HashMap::new(),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Main server loop. Runs until the task is dropped; failed accepts are
    /// logged and retried.
    pub async fn run(mut self) -> Result<(), NetworkError> {
        info!("Server started successfully");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    self.handle_accept(accepted).await;
                },

                // The loop holds a sender itself, so the channel never closes.
                Some(message) = self.server_rx.recv() => {
                    self.handle_message(message);
                },
            }
        }
    }

    async fn handle_accept(&mut self, accepted: std::io::Result<(TcpStream, SocketAddr)>) {
        match accepted {
            Ok((stream, addr)) => {
                let id = self.relay.generate_id();
                tokio::spawn(serve_connection(
                    stream,
                    addr,
                    id,
                    self.server_tx.clone(),
                ));
            }
            Err(e) => {
                // Usually fd exhaustion or an aborted handshake; existing
                // connections are unaffected.
                error!("Failed to accept connection: {}", e);
                sleep(ACCEPT_RETRY_DELAY).await;
            }
        }
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Connected { id, addr, sender } => {
                debug!("Connection {} opened from {}", id, addr);
                self.connections.insert(id.clone(), sender);
                let outbound = self.relay.connect(id);
                self.dispatch(outbound);
            }

            ServerMessage::Frame { id, text } => {
                let result = ClientMessage::decode(&text)
                    .and_then(|message| self.relay.handle_message(&id, message));

                match result {
                    Ok(outbound) => self.dispatch(outbound),
                    Err(ProtocolError::UnknownPlayer(_)) => {
                        debug!("Dropping message from departed player {}", id);
                    }
                    Err(e) => warn!("Dropping message from {}: {}", id, e),
                }
            }

            ServerMessage::Disconnected { id } => {
                self.connections.remove(&id);
                let outbound = self.relay.disconnect(&id);
                self.dispatch(outbound);
            }
        }
    }

    /// Encodes each event once and queues it on every targeted connection.
    fn dispatch(&self, outbound: Vec<Outbound>) {
        for Outbound { target, event } in outbound {
            let text = match event.encode() {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode {} event: {}", event.name(), e);
                    continue;
                }
            };

            match &target {
                Target::To(id) => self.send_to(id, &text),
                Target::All | Target::AllExcept(_) => {
                    for id in self.connections.keys() {
                        if target.includes(id) {
                            self.send_to(id, &text);
                        }
                    }
                }
            }
        }
    }

    fn send_to(&self, id: &PlayerId, text: &str) {
        if let Some(sender) = self.connections.get(id) {
            // A closed channel means the connection task is already exiting.
            if sender.send(Message::Text(text.to_string())).is_err() {
                debug!("Connection {} already closed", id);
            }
        }
    }
}

/// Accepts the upgrade from any origin.
fn accept_any_origin(request: &Request, response: Response) -> Result<Response, ErrorResponse> {
    if let Some(origin) = request.headers().get("origin") {
        debug!("Accepting WebSocket upgrade from origin {:?}", origin);
    }
    Ok(response)
}

/// Runs one connection: forwards decoded frames to the main loop and writes
/// queued outbound messages to the socket.
async fn serve_connection(
    stream: TcpStream,
    addr: SocketAddr,
    id: PlayerId,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let socket = match tokio_tungstenite::accept_hdr_async(stream, accept_any_origin).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let (mut sink, mut stream) = socket.split();
    let (sender, mut outgoing) = mpsc::unbounded_channel::<Message>();

    if server_tx
        .send(ServerMessage::Connected {
            id: id.clone(),
            addr,
            sender,
        })
        .is_err()
    {
        error!("Server loop is gone, dropping connection from {}", addr);
        return;
    }

    let writer_id = id.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            if let Err(e) = sink.send(message).await {
                debug!("Failed to write to {}: {}", writer_id, e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if server_tx
                    .send(ServerMessage::Frame {
                        id: id.clone(),
                        text,
                    })
                    .is_err()
                {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                warn!("Dropping binary frame from {}: expected JSON text", id);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Connection {} lost: {}", id, e);
                break;
            }
        }
    }

    let _ = server_tx.send(ServerMessage::Disconnected { id });
    writer.abort();
}
