use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn heading(self) -> Heading {
        let (dx, dy) = self.delta();
        Heading { dx, dy }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

/// Unit facing vector as the renderer consumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub dx: i32,
    pub dy: i32,
}

impl Default for Heading {
    fn default() -> Self {
        Direction::Right.heading()
    }
}

/// Held directional keys of one player. Replaced wholesale on every input event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// Collapses held keys into one direction: left, right, up, then down.
    pub fn resolve(&self) -> Option<Direction> {
        if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub cx: i32,
    pub cy: i32,
    pub dir: Heading,
    pub input: InputState,
    pub score: u32,
    pub color: String,
    #[serde(rename = "powerUntil")]
    pub power_until: u64,
    #[serde(rename = "stunnedUntil")]
    pub stunned_until: u64,
    #[serde(rename = "lastMoveAt")]
    pub last_move_at: u64,
}

impl PlayerView {
    pub fn is_powered(&self, now_ms: u64) -> bool {
        now_ms < self.power_until
    }

    pub fn is_stunned(&self, now_ms: u64) -> bool {
        now_ms < self.stunned_until
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub users: BTreeMap<String, PlayerView>,
    pub pellets: BTreeMap<String, bool>,
    #[serde(rename = "powerPellets")]
    pub power_pellets: BTreeMap<String, bool>,
    #[serde(rename = "lastWinner")]
    pub last_winner: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct MapView {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
}
