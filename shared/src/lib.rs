use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub mod error;
pub mod protocol;

pub use error::ProtocolError;
pub use protocol::{ActionBroadcast, ClientMessage, PlayerAction, ServerEvent, Welcome};

/// Ground level. Larger y is lower on screen, so a jump decreases y.
pub const BASE_Y: f32 = 350.0;
pub const JUMP_VELOCITY: f32 = 10.0;
pub const GRAVITY: f32 = 0.5;
/// Terminal velocity. Falling speed never exceeds this magnitude.
pub const MAX_VELOCITY: f32 = -10.0;
/// Fixed physics step of the jump animator (60 Hz).
pub const JUMP_TICK: Duration = Duration::from_nanos(16_666_667);

pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);
pub const PROGRESS_STEP_X: f32 = 5.0;
pub const PROGRESS_STEP_SCORE: u32 = 1;

pub const DEFAULT_PORT: u16 = 3001;
pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 400.0;
pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 50.0;
pub const SLIDE_HEIGHT: f32 = 30.0;

/// Opaque connection identity, assigned by the server when a socket connects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First five characters, used for scoreboard labels.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(5) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full player mapping as exchanged in snapshots.
pub type PlayerMap = BTreeMap<PlayerId, Player>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub score: u32,
    pub is_jumping: bool,
    pub is_sliding: bool,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            x: 0.0,
            y: BASE_Y,
            score: 0,
            is_jumping: false,
            is_sliding: false,
        }
    }

    pub fn flag(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Jump => self.is_jumping,
            ActionKind::Slide => self.is_sliding,
        }
    }

    /// Sets the boolean field an action type controls.
    pub fn set_flag(&mut self, kind: ActionKind, value: bool) {
        match kind {
            ActionKind::Jump => self.is_jumping = value,
            ActionKind::Slide => self.is_sliding = value,
        }
    }

    /// Shallow merge: every field present in the patch overwrites the stored one.
    /// The identity is never part of a patch.
    pub fn merge(&mut self, patch: &PlayerPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
        if let Some(is_jumping) = patch.is_jumping {
            self.is_jumping = is_jumping;
        }
        if let Some(is_sliding) = patch.is_sliding {
            self.is_sliding = is_sliding;
        }
    }

    pub fn height(&self) -> f32 {
        if self.is_sliding {
            SLIDE_HEIGHT
        } else {
            PLAYER_HEIGHT
        }
    }
}

/// Client-reported partial player state.
///
/// `seq` is an ordering token. The server carries it but does not reject
/// stale updates yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_jumping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sliding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl PlayerPatch {
    pub fn progress(x: f32, score: u32, seq: u64) -> Self {
        Self {
            x: Some(x),
            score: Some(score),
            seq: Some(seq),
            ..Self::default()
        }
    }

    /// Rejects coordinates that JSON cannot carry back out. An out-of-range
    /// number such as `1e39` parses as infinity and would be re-encoded as
    /// `null`, breaking every later snapshot.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        for (field, value) in [("x", self.x), ("y", self.y)] {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(ProtocolError::MalformedPayload(format!(
                        "{} is not a finite number",
                        field
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Discrete player actions. Each one drives exactly one boolean field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Jump,
    Slide,
}

const ACTION_TABLE: [(&str, ActionKind); 2] =
    [("jump", ActionKind::Jump), ("slide", ActionKind::Slide)];

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Jump => "jump",
            ActionKind::Slide => "slide",
        }
    }
}

impl FromStr for ActionKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTION_TABLE
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| ProtocolError::InvalidActionType(s.to_string()))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
