//! Authoritative player registry
//!
//! The registry is the single source of truth for which players exist. It is
//! owned by the server event loop and mutated only from there, one message at
//! a time, so it needs no locking.
//!
//! Every operation tolerates an id that is no longer registered: messages
//! from a connection can still be in flight after its disconnect has been
//! processed.

use log::{debug, info};
use rand::distributions::Alphanumeric;
use rand::Rng;
use shared::{ActionKind, Player, PlayerId, PlayerMap, PlayerPatch};

const ID_LENGTH: usize = 20;

#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: PlayerMap,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: PlayerMap::new(),
        }
    }

    /// Generates a fresh connection identity not used by any live player.
    pub fn generate_id(&self) -> PlayerId {
        let mut rng = rand::thread_rng();
        loop {
            let candidate: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(ID_LENGTH)
                .map(char::from)
                .collect();
            let id = PlayerId::new(candidate);
            if !self.players.contains_key(&id) {
                return id;
            }
        }
    }

    /// Registers a default player for a new connection and returns it.
    pub fn on_connect(&mut self, id: PlayerId) -> Player {
        let player = Player::new(id.clone());
        info!("Player connected: {}", id);
        self.players.insert(id, player.clone());
        player
    }

    /// Removes the player. Returns the removed entry, or None if it was
    /// already gone.
    pub fn on_disconnect(&mut self, id: &PlayerId) -> Option<Player> {
        let removed = self.players.remove(id);
        if removed.is_some() {
            info!("Player disconnected: {}", id);
        }
        removed
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// Sets the flag driven by `kind`. Returns false if the player is unknown.
    pub fn apply_action(&mut self, id: &PlayerId, kind: ActionKind, value: bool) -> bool {
        match self.players.get_mut(id) {
            Some(player) => {
                player.set_flag(kind, value);
                true
            }
            None => false,
        }
    }

    /// Shallow-merges client-reported fields into the stored player.
    ///
    /// Clients are trusted for these fields: there is no range or
    /// monotonicity check. Returns the merged player.
    pub fn apply_update(&mut self, id: &PlayerId, patch: &PlayerPatch) -> Option<&Player> {
        let player = self.players.get_mut(id)?;
        if let Some(seq) = patch.seq {
            debug!("Update #{} from {}", seq, id);
        }
        player.merge(patch);
        Some(player)
    }

    pub fn snapshot(&self) -> PlayerMap {
        self.players.clone()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.keys()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BASE_Y;

    fn id(name: &str) -> PlayerId {
        PlayerId::new(name)
    }

    #[test]
    fn test_connect_creates_default_player() {
        let mut registry = PlayerRegistry::new();
        let player = registry.on_connect(id("A"));

        assert_eq!(player.id, id("A"));
        assert_eq!(player.x, 0.0);
        assert_eq!(player.y, BASE_Y);
        assert_eq!(player.score, 0);
        assert!(!player.is_jumping);
        assert!(!player.is_sliding);
        assert_eq!(registry.get(&id("A")), Some(&player));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut registry = PlayerRegistry::new();
        registry.on_connect(id("A"));

        assert!(registry.on_disconnect(&id("A")).is_some());
        assert!(registry.on_disconnect(&id("A")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_action_last_write_wins() {
        let mut registry = PlayerRegistry::new();
        registry.on_connect(id("A"));

        assert!(registry.apply_action(&id("A"), ActionKind::Jump, true));
        assert!(registry.get(&id("A")).unwrap().is_jumping);

        assert!(registry.apply_action(&id("A"), ActionKind::Jump, false));
        let player = registry.get(&id("A")).unwrap();
        assert!(!player.is_jumping);
        assert!(!player.is_sliding);
    }

    #[test]
    fn test_action_for_unknown_player_is_noop() {
        let mut registry = PlayerRegistry::new();
        registry.on_connect(id("A"));

        assert!(!registry.apply_action(&id("B"), ActionKind::Slide, true));
        assert_eq!(registry.len(), 1);
        assert!(!registry.get(&id("A")).unwrap().is_sliding);
    }

    #[test]
    fn test_update_merges_without_validation() {
        let mut registry = PlayerRegistry::new();
        registry.on_connect(id("A"));
        registry.apply_update(&id("A"), &PlayerPatch::progress(100.0, 20, 1));

        // A smaller x is accepted as-is.
        let patch = PlayerPatch {
            x: Some(-5.0),
            ..PlayerPatch::default()
        };
        let merged = registry.apply_update(&id("A"), &patch).unwrap();

        assert_eq!(merged.x, -5.0);
        assert_eq!(merged.score, 20);
    }

    #[test]
    fn test_update_twice_equals_once() {
        let mut registry = PlayerRegistry::new();
        registry.on_connect(id("A"));
        let patch = PlayerPatch::progress(10.0, 2, 1);

        let once = registry.apply_update(&id("A"), &patch).cloned();
        let twice = registry.apply_update(&id("A"), &patch).cloned();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_for_unknown_player_is_noop() {
        let mut registry = PlayerRegistry::new();

        assert!(registry
            .apply_update(&id("ghost"), &PlayerPatch::progress(10.0, 2, 1))
            .is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique_and_sized() {
        let mut registry = PlayerRegistry::new();
        for _ in 0..50 {
            let new_id = registry.generate_id();
            assert_eq!(new_id.as_str().len(), ID_LENGTH);
            assert!(!registry.contains(&new_id));
            registry.on_connect(new_id);
        }
        assert_eq!(registry.len(), 50);
    }

    #[test]
    fn test_keys_track_open_connections() {
        let mut registry = PlayerRegistry::new();
        let mut open: Vec<PlayerId> = Vec::new();

        // Interleaved connects and disconnects, including repeated removals.
        let script = [
            ("A", true),
            ("B", true),
            ("A", false),
            ("C", true),
            ("A", false),
            ("B", false),
            ("D", true),
        ];

        for (name, connect) in script {
            if connect {
                registry.on_connect(id(name));
                open.push(id(name));
            } else {
                registry.on_disconnect(&id(name));
                open.retain(|open_id| *open_id != id(name));
            }

            let mut keys: Vec<PlayerId> = registry.ids().cloned().collect();
            keys.sort();
            let mut expected = open.clone();
            expected.sort();
            assert_eq!(keys, expected);
        }
    }
}
