//! Wire protocol between server and clients.
//!
//! Every WebSocket text frame carries one JSON object of the form
//! `{"event": "<name>", "data": <payload>}`.

use crate::{ActionKind, Player, PlayerId, PlayerMap, PlayerPatch, ProtocolError};
use serde::{Deserialize, Serialize};

/// A key transition as reported by a client.
///
/// The type travels as a free-form string so an unknown type can be told
/// apart from a malformed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub value: bool,
}

impl PlayerAction {
    pub fn new(kind: ActionKind, value: bool) -> Self {
        Self {
            action_type: kind.as_str().to_string(),
            value,
        }
    }

    pub fn kind(&self) -> Result<ActionKind, ProtocolError> {
        self.action_type.parse()
    }
}

/// An action relayed by the server, tagged with the player that sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBroadcast {
    pub id: PlayerId,
    pub action: PlayerAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Welcome {
    pub id: PlayerId,
}

/// Client → server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerAction(PlayerAction),
    PlayerUpdate(PlayerPatch),
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Sent once to a new connection: its own identity.
    Connected(Welcome),
    CurrentPlayers(PlayerMap),
    NewPlayer(Player),
    PlayerAction(ActionBroadcast),
    /// The merged player after a client update.
    PlayerUpdate(Player),
    PlayerDisconnected(PlayerId),
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ServerEvent {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected(_) => "connected",
            ServerEvent::CurrentPlayers(_) => "currentPlayers",
            ServerEvent::NewPlayer(_) => "newPlayer",
            ServerEvent::PlayerAction(_) => "playerAction",
            ServerEvent::PlayerUpdate(_) => "playerUpdate",
            ServerEvent::PlayerDisconnected(_) => "playerDisconnected",
        }
    }
}
