//! Jump animation
//!
//! Vertical motion is integrated per player with a fixed timestep
//! (`JUMP_TICK`), independent of the display refresh rate. The step itself is
//! a pure function so it can be tested and replayed without a window.

use crate::store::PlayerStore;
use log::debug;
use shared::{PlayerId, BASE_Y, GRAVITY, JUMP_TICK, JUMP_VELOCITY, MAX_VELOCITY};
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound on ticks run per `advance` call, so a long stall does not
/// freeze the frame catching up.
const MAX_TICKS_PER_ADVANCE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpState {
    pub y: f32,
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpStep {
    Airborne(JumpState),
    Landed,
}

/// One physics tick. Positive velocity moves up (decreasing y).
pub fn step(state: JumpState) -> JumpStep {
    let y = state.y - state.velocity;
    let velocity = (state.velocity - GRAVITY).max(MAX_VELOCITY);

    if y >= BASE_Y {
        JumpStep::Landed
    } else {
        JumpStep::Airborne(JumpState { y, velocity })
    }
}

/// Tracks which players are mid-jump and their current velocity.
///
/// Being tracked here is the "is animating" guard; it is separate from the
/// `is_jumping` display flag, which the key release may clear mid-air.
#[derive(Debug, Default)]
pub struct JumpAnimator {
    velocities: HashMap<PlayerId, f32>,
    accumulator: Duration,
}

impl JumpAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self, id: &PlayerId) -> bool {
        self.velocities.contains_key(id)
    }

    pub fn active(&self) -> usize {
        self.velocities.len()
    }

    /// Starts a jump. Does nothing if the player is already airborne.
    pub fn start(&mut self, id: PlayerId) -> bool {
        if self.is_animating(&id) {
            return false;
        }
        debug!("Jump started for {}", id);
        self.velocities.insert(id, JUMP_VELOCITY);
        true
    }

    pub fn forget(&mut self, id: &PlayerId) {
        self.velocities.remove(id);
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&PlayerId) -> bool) {
        self.velocities.retain(|id, _| keep(id));
    }

    /// Runs as many fixed ticks as `dt` covers. Returns the number run.
    pub fn advance(&mut self, dt: Duration, store: &mut PlayerStore) -> u32 {
        if self.velocities.is_empty() {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        self.accumulator += dt;
        let mut ticks = 0;
        while self.accumulator >= JUMP_TICK && !self.velocities.is_empty() {
            self.accumulator -= JUMP_TICK;
            self.tick(store);
            ticks += 1;

            if ticks == MAX_TICKS_PER_ADVANCE {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ticks
    }

    /// Advances every airborne player by one tick.
    pub fn tick(&mut self, store: &mut PlayerStore) {
        let mut finished = Vec::new();

        for (id, velocity) in self.velocities.iter_mut() {
            let y = match store.get(id) {
                Some(player) => player.y,
                // Removed mid-jump.
                None => {
                    finished.push(id.clone());
                    continue;
                }
            };

            match step(JumpState {
                y,
                velocity: *velocity,
            }) {
                JumpStep::Airborne(next) => {
                    *velocity = next.velocity;
                    store.set_y(id, next.y);
                }
                JumpStep::Landed => {
                    store.land(id);
                    finished.push(id.clone());
                }
            }
        }

        for id in finished {
            self.velocities.remove(&id);
        }
    }
}
