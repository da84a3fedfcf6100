//! Keyboard input mapped to discrete player actions

use macroquad::prelude::{is_key_pressed, is_key_released, KeyCode};
use shared::ActionKind;
use std::collections::HashSet;

/// Physical keys the game listens to.
const MAPPED_KEYS: [KeyCode; 3] = [KeyCode::Space, KeyCode::LeftShift, KeyCode::RightShift];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Pressed(KeyCode),
    Released(KeyCode),
}

pub fn action_for_key(key: KeyCode) -> Option<ActionKind> {
    match key {
        KeyCode::Space => Some(ActionKind::Jump),
        KeyCode::LeftShift | KeyCode::RightShift => Some(ActionKind::Slide),
        _ => None,
    }
}

/// Samples this frame's transitions of the mapped keys.
pub fn poll_transitions() -> Vec<KeyTransition> {
    let mut transitions = Vec::new();
    for key in MAPPED_KEYS {
        if is_key_pressed(key) {
            transitions.push(KeyTransition::Pressed(key));
        }
        if is_key_released(key) {
            transitions.push(KeyTransition::Released(key));
        }
    }
    transitions
}

/// Turns key transitions into action edges.
///
/// Held state is tracked per physical key. An action goes true when its
/// first key goes down and false when its last key comes up, so OS key
/// repeat cannot restart a jump mid-air and the two Shift keys behave as one.
#[derive(Debug, Default)]
pub struct InputHandler {
    held: HashSet<KeyCode>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the action and its new value, or None for unmapped keys and
    /// transitions that leave the action unchanged.
    pub fn handle(&mut self, transition: KeyTransition) -> Option<(ActionKind, bool)> {
        match transition {
            KeyTransition::Pressed(key) => {
                let kind = action_for_key(key)?;
                let was_held = self.is_held(kind);
                self.held.insert(key);
                (!was_held).then_some((kind, true))
            }
            KeyTransition::Released(key) => {
                let kind = action_for_key(key)?;
                self.held.remove(&key);
                // A release with no tracked press still clears the action.
                (!self.is_held(kind)).then_some((kind, false))
            }
        }
    }

    pub fn is_held(&self, kind: ActionKind) -> bool {
        self.held
            .iter()
            .any(|key| action_for_key(*key) == Some(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for_key(KeyCode::Space), Some(ActionKind::Jump));
        assert_eq!(action_for_key(KeyCode::LeftShift), Some(ActionKind::Slide));
        assert_eq!(action_for_key(KeyCode::RightShift), Some(ActionKind::Slide));
        assert_eq!(action_for_key(KeyCode::A), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut input = InputHandler::new();

        assert_eq!(
            input.handle(KeyTransition::Pressed(KeyCode::Space)),
            Some((ActionKind::Jump, true))
        );
        assert!(input.is_held(ActionKind::Jump));
        assert_eq!(
            input.handle(KeyTransition::Released(KeyCode::Space)),
            Some((ActionKind::Jump, false))
        );
        assert!(!input.is_held(ActionKind::Jump));
    }

    #[test]
    fn test_repeated_press_is_ignored() {
        let mut input = InputHandler::new();

        assert!(input.handle(KeyTransition::Pressed(KeyCode::Space)).is_some());
        assert_eq!(input.handle(KeyTransition::Pressed(KeyCode::Space)), None);

        input.handle(KeyTransition::Released(KeyCode::Space));
        assert!(input.handle(KeyTransition::Pressed(KeyCode::Space)).is_some());
    }

    #[test]
    fn test_both_shift_keys_share_the_slide_action() {
        let mut input = InputHandler::new();

        assert!(input
            .handle(KeyTransition::Pressed(KeyCode::LeftShift))
            .is_some());
        assert_eq!(input.handle(KeyTransition::Pressed(KeyCode::RightShift)), None);

        // Slide stays on until the last Shift key comes up.
        assert_eq!(input.handle(KeyTransition::Released(KeyCode::LeftShift)), None);
        assert!(input.is_held(ActionKind::Slide));
        assert_eq!(
            input.handle(KeyTransition::Released(KeyCode::RightShift)),
            Some((ActionKind::Slide, false))
        );
        assert!(!input.is_held(ActionKind::Slide));
    }

    #[test]
    fn test_untracked_release_still_clears() {
        let mut input = InputHandler::new();

        assert_eq!(
            input.handle(KeyTransition::Released(KeyCode::RightShift)),
            Some((ActionKind::Slide, false))
        );
    }

    #[test]
    fn test_unmapped_keys_emit_nothing() {
        let mut input = InputHandler::new();

        assert_eq!(input.handle(KeyTransition::Pressed(KeyCode::Enter)), None);
        assert_eq!(input.handle(KeyTransition::Released(KeyCode::Enter)), None);
    }
}
