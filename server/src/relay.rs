//! Action and update relay
//!
//! Turns connection lifecycle events and decoded client messages into
//! registry mutations plus a list of addressed outbound events. The relay has
//! no knowledge of sockets; the network layer delivers what it returns.

use crate::registry::PlayerRegistry;
use log::debug;
use shared::{
    ActionBroadcast, ClientMessage, PlayerAction, PlayerId, PlayerPatch, ProtocolError,
    ServerEvent, Welcome,
};

/// Who an outbound event is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single connection.
    To(PlayerId),
    /// Every open connection.
    All,
    /// Every open connection except the given one.
    AllExcept(PlayerId),
}

impl Target {
    pub fn includes(&self, id: &PlayerId) -> bool {
        match self {
            Target::To(target) => target == id,
            Target::All => true,
            Target::AllExcept(excluded) => excluded != id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub target: Target,
    pub event: ServerEvent,
}

impl Outbound {
    fn new(target: Target, event: ServerEvent) -> Self {
        Self { target, event }
    }
}

#[derive(Debug, Default)]
pub struct Relay {
    registry: PlayerRegistry,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            registry: PlayerRegistry::new(),
        }
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn generate_id(&self) -> PlayerId {
        self.registry.generate_id()
    }

    /// Registers the player, then sends it its identity and the full snapshot
    /// and announces it to everyone else.
    pub fn connect(&mut self, id: PlayerId) -> Vec<Outbound> {
        let player = self.registry.on_connect(id.clone());

        vec![
            Outbound::new(
                Target::To(id.clone()),
                ServerEvent::Connected(Welcome { id: id.clone() }),
            ),
            Outbound::new(
                Target::To(id.clone()),
                ServerEvent::CurrentPlayers(self.registry.snapshot()),
            ),
            Outbound::new(Target::AllExcept(id), ServerEvent::NewPlayer(player)),
        ]
    }

    /// Removes the player and tells the remaining connections. Nothing is
    /// broadcast if the player was already gone.
    pub fn disconnect(&mut self, id: &PlayerId) -> Vec<Outbound> {
        match self.registry.on_disconnect(id) {
            Some(_) => vec![Outbound::new(
                Target::All,
                ServerEvent::PlayerDisconnected(id.clone()),
            )],
            None => Vec::new(),
        }
    }

    pub fn handle_message(
        &mut self,
        id: &PlayerId,
        message: ClientMessage,
    ) -> Result<Vec<Outbound>, ProtocolError> {
        match message {
            ClientMessage::PlayerAction(action) => self.handle_action(id, action),
            ClientMessage::PlayerUpdate(patch) => self.handle_update(id, &patch),
        }
    }

    /// Applies a key transition and echoes it to every connection, the
    /// sender included.
    pub fn handle_action(
        &mut self,
        id: &PlayerId,
        action: PlayerAction,
    ) -> Result<Vec<Outbound>, ProtocolError> {
        if !self.registry.contains(id) {
            return Err(ProtocolError::UnknownPlayer(id.clone()));
        }
        let kind = action.kind()?;

        debug!("Action received from {}: {} = {}", id, kind, action.value);
        self.registry.apply_action(id, kind, action.value);

        Ok(vec![Outbound::new(
            Target::All,
            ServerEvent::PlayerAction(ActionBroadcast {
                id: id.clone(),
                action,
            }),
        )])
    }

    /// Merges client-reported state and forwards the merged player to
    /// everyone but the sender.
    pub fn handle_update(
        &mut self,
        id: &PlayerId,
        patch: &PlayerPatch,
    ) -> Result<Vec<Outbound>, ProtocolError> {
        patch.validate()?;
        let merged = self
            .registry
            .apply_update(id, patch)
            .cloned()
            .ok_or_else(|| ProtocolError::UnknownPlayer(id.clone()))?;

        Ok(vec![Outbound::new(
            Target::AllExcept(id.clone()),
            ServerEvent::PlayerUpdate(merged),
        )])
    }
}
