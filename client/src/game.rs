//! Client session: the local replica plus every loop that writes to it.

use crate::animator::JumpAnimator;
use crate::input::{InputHandler, KeyTransition};
use crate::progress::ProgressTicker;
use crate::store::PlayerStore;
use log::{debug, info, warn};
use shared::{
    ActionKind, ClientMessage, PlayerAction, PlayerId, PlayerMap, PlayerPatch, ServerEvent,
    PROGRESS_INTERVAL, PROGRESS_STEP_SCORE, PROGRESS_STEP_X,
};
use std::sync::Arc;
use std::time::Duration;

pub struct Session {
    local_id: Option<PlayerId>,
    store: PlayerStore,
    animator: JumpAnimator,
    input: InputHandler,
    progress: ProgressTicker,
}

impl Session {
    pub fn new() -> Self {
        Self {
            local_id: None,
            store: PlayerStore::new(),
            animator: JumpAnimator::new(),
            input: InputHandler::new(),
            progress: ProgressTicker::new(PROGRESS_INTERVAL),
        }
    }

    pub fn local_id(&self) -> Option<&PlayerId> {
        self.local_id.as_ref()
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    pub fn players(&self) -> Arc<PlayerMap> {
        self.store.snapshot()
    }

    pub fn is_animating(&self, id: &PlayerId) -> bool {
        self.animator.is_animating(id)
    }

    pub fn is_running(&self) -> bool {
        self.progress.is_running()
    }

    /// Applies one event received from the server.
    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected(welcome) => {
                info!("Connected! Player ID: {}", welcome.id);
                self.local_id = Some(welcome.id);
            }

            ServerEvent::CurrentPlayers(players) => {
                debug!("Received snapshot of {} players", players.len());
                self.store.replace_all(players);
                let store = &self.store;
                self.animator.retain(|id| store.contains(id));
            }

            ServerEvent::NewPlayer(player) => {
                debug!("Player joined: {}", player.id);
                self.store.insert_new(player);
            }

            ServerEvent::PlayerAction(broadcast) => match self.store.apply_action(&broadcast) {
                Some(ActionKind::Jump) if broadcast.action.value => {
                    self.animator.start(broadcast.id);
                }
                Some(_) => {}
                None => {
                    if let Err(e) = broadcast.action.kind() {
                        warn!("Ignoring action from {}: {}", broadcast.id, e);
                    }
                }
            },

            ServerEvent::PlayerUpdate(player) => {
                self.store.apply_remote_update(&player);
            }

            ServerEvent::PlayerDisconnected(id) => {
                debug!("Player left: {}", id);
                self.store.remove(&id);
                self.animator.forget(&id);
            }
        }
    }

    /// Handles a key transition for the local player: updates the replica
    /// optimistically and returns the message to send.
    pub fn handle_key(&mut self, transition: KeyTransition) -> Option<ClientMessage> {
        let local_id = self.local_id.clone()?;
        let (kind, value) = self.input.handle(transition)?;

        debug!("Key {:?}: {} = {}", transition, kind, value);
        self.store.set_flag(&local_id, kind, value);
        if kind == ActionKind::Jump && value {
            self.animator.start(local_id);
        }

        Some(ClientMessage::PlayerAction(PlayerAction::new(kind, value)))
    }

    /// Advances the jump animator and the progress clock by `dt`. Returns the
    /// progress updates to report.
    pub fn update(&mut self, dt: Duration) -> Vec<ClientMessage> {
        self.animator.advance(dt, &mut self.store);

        let mut outgoing = Vec::new();
        let due = self.progress.advance(dt);
        let Some(local_id) = self.local_id.as_ref() else {
            return outgoing;
        };

        for _ in 0..due {
            let Some((x, score)) =
                self.store
                    .advance_progress(local_id, PROGRESS_STEP_X, PROGRESS_STEP_SCORE)
            else {
                break;
            };
            let seq = self.progress.next_seq();
            outgoing.push(ClientMessage::PlayerUpdate(PlayerPatch::progress(
                x, score, seq,
            )));
        }
        outgoing
    }

    /// Ends the session: the progress clock stops for good.
    pub fn end(&mut self) {
        info!("Session ended");
        self.progress.stop();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
