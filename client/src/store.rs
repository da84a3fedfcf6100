//! Client-side replica of every player's state.
//!
//! The mapping lives behind an `Arc` and is copied on write, so a snapshot
//! handed to the renderer never changes underneath it.

use shared::{ActionBroadcast, ActionKind, Player, PlayerId, PlayerMap, BASE_Y};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct PlayerStore {
    players: Arc<PlayerMap>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current immutable snapshot of the mapping.
    pub fn snapshot(&self) -> Arc<PlayerMap> {
        Arc::clone(&self.players)
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Replaces the whole mapping with a server snapshot.
    pub fn replace_all(&mut self, players: PlayerMap) {
        self.players = Arc::new(players);
    }

    /// Inserts a newly announced player. An existing entry is kept.
    pub fn insert_new(&mut self, player: Player) -> bool {
        if self.contains(&player.id) {
            return false;
        }
        Arc::make_mut(&mut self.players).insert(player.id.clone(), player);
        true
    }

    /// Applies a relayed action. Returns the kind applied, or None when the
    /// player is unknown or the action type is not recognized.
    pub fn apply_action(&mut self, broadcast: &ActionBroadcast) -> Option<ActionKind> {
        let kind = broadcast.action.kind().ok()?;
        self.set_flag(&broadcast.id, kind, broadcast.action.value)
            .then_some(kind)
    }

    /// Applies the server's echo of another client's progress. Only the
    /// horizontal progress is taken: vertical motion is animated locally.
    /// Unknown ids are ignored so a late update cannot resurrect a player.
    pub fn apply_remote_update(&mut self, update: &Player) -> bool {
        self.modify(&update.id, |player| {
            player.x = update.x;
            player.score = update.score;
        })
    }

    pub fn remove(&mut self, id: &PlayerId) -> Option<Player> {
        if !self.contains(id) {
            return None;
        }
        Arc::make_mut(&mut self.players).remove(id)
    }

    pub fn set_flag(&mut self, id: &PlayerId, kind: ActionKind, value: bool) -> bool {
        self.modify(id, |player| player.set_flag(kind, value))
    }

    pub fn set_y(&mut self, id: &PlayerId, y: f32) -> bool {
        self.modify(id, |player| player.y = y)
    }

    /// Puts the player back on the ground and clears the jump flag.
    pub fn land(&mut self, id: &PlayerId) -> bool {
        self.modify(id, |player| {
            player.y = BASE_Y;
            player.is_jumping = false;
        })
    }

    /// Advances horizontal progress and returns the new `(x, score)`.
    pub fn advance_progress(&mut self, id: &PlayerId, dx: f32, dscore: u32) -> Option<(f32, u32)> {
        let mut progress = None;
        self.modify(id, |player| {
            player.x += dx;
            player.score += dscore;
            progress = Some((player.x, player.score));
        });
        progress
    }

    fn modify(&mut self, id: &PlayerId, f: impl FnOnce(&mut Player)) -> bool {
        if !self.contains(id) {
            return false;
        }
        match Arc::make_mut(&mut self.players).get_mut(id) {
            Some(player) => {
                f(player);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PlayerAction;

    fn id(name: &str) -> PlayerId {
        PlayerId::new(name)
    }

    fn store_with(names: &[&str]) -> PlayerStore {
        let mut store = PlayerStore::new();
        store.replace_all(
            names
                .iter()
                .map(|name| (id(name), Player::new(id(name))))
                .collect(),
        );
        store
    }

    #[test]
    fn test_snapshot_replaces_everything() {
        let mut store = store_with(&["A", "B"]);
        store.replace_all(PlayerMap::new());
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_new_keeps_existing_entry() {
        let mut store = store_with(&["A"]);
        store.set_y(&id("A"), 300.0);

        assert!(!store.insert_new(Player::new(id("A"))));
        assert_eq!(store.get(&id("A")).unwrap().y, 300.0);
        assert!(store.insert_new(Player::new(id("B"))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_action_uses_field_table() {
        let mut store = store_with(&["A"]);
        let slide = ActionBroadcast {
            id: id("A"),
            action: PlayerAction::new(ActionKind::Slide, true),
        };

        assert_eq!(store.apply_action(&slide), Some(ActionKind::Slide));
        let player = store.get(&id("A")).unwrap();
        assert!(player.is_sliding);
        assert!(!player.is_jumping);
    }

    #[test]
    fn test_unknown_action_type_changes_nothing() {
        let mut store = store_with(&["A"]);
        let before = store.snapshot();
        let action = ActionBroadcast {
            id: id("A"),
            action: PlayerAction {
                action_type: "dash".to_string(),
                value: true,
            },
        };

        assert_eq!(store.apply_action(&action), None);
        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn test_action_for_unknown_player_is_ignored() {
        let mut store = store_with(&["A"]);
        let action = ActionBroadcast {
            id: id("B"),
            action: PlayerAction::new(ActionKind::Jump, true),
        };

        assert_eq!(store.apply_action(&action), None);
        assert!(!store.contains(&id("B")));
    }

    #[test]
    fn test_remote_update_takes_progress_only() {
        let mut store = store_with(&["A"]);
        store.set_y(&id("A"), 280.0);

        let mut echo = Player::new(id("A"));
        echo.x = 25.0;
        echo.score = 5;
        echo.is_sliding = true;

        assert!(store.apply_remote_update(&echo));
        let player = store.get(&id("A")).unwrap();
        assert_eq!(player.x, 25.0);
        assert_eq!(player.score, 5);
        assert_eq!(player.y, 280.0);
        assert!(!player.is_sliding);
    }

    #[test]
    fn test_update_does_not_resurrect() {
        let mut store = store_with(&["A"]);
        store.remove(&id("A"));

        assert!(!store.apply_remote_update(&Player::new(id("A"))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_old_snapshot_is_unaffected_by_writes() {
        let mut store = store_with(&["A"]);
        let before = store.snapshot();

        store.advance_progress(&id("A"), 5.0, 1);
        store.insert_new(Player::new(id("B")));

        assert_eq!(before.len(), 1);
        assert_eq!(before[&id("A")].x, 0.0);
        assert_eq!(store.get(&id("A")).unwrap().x, 5.0);
    }

    #[test]
    fn test_land_resets_vertical_state() {
        let mut store = store_with(&["A"]);
        store.set_flag(&id("A"), ActionKind::Jump, true);
        store.set_y(&id("A"), 250.0);

        assert!(store.land(&id("A")));
        let player = store.get(&id("A")).unwrap();
        assert_eq!(player.y, BASE_Y);
        assert!(!player.is_jumping);
    }
}
