use crate::constants::{FALLBACK_SPAWN, SPAWN_ATTEMPTS};
use crate::rng::Rng;
use crate::types::Vec2;
use crate::world::{is_walkable, GRID_COLS, GRID_ROWS};

use super::GameEngine;

impl GameEngine {
    pub(super) fn pick_spawn_position(&mut self) -> Vec2 {
        let occupied: Vec<(i32, i32)> =
            self.players().map(|player| (player.cx, player.cy)).collect();
        self.pick_spawn_where(|x, y| is_walkable(x, y) && !occupied.contains(&(x, y)))
    }

    pub(super) fn pick_spawn_where(&mut self, is_free: impl Fn(i32, i32) -> bool) -> Vec2 {
        search_spawn(&mut self.rng, is_free)
    }
}

/// Random cell accepted by `is_free`, or the fixed fallback once the bounded
/// search runs out.
pub(super) fn search_spawn(rng: &mut Rng, is_free: impl Fn(i32, i32) -> bool) -> Vec2 {
    for _ in 0..SPAWN_ATTEMPTS {
        let x = rng.int(0, GRID_COLS - 1);
        let y = rng.int(0, GRID_ROWS - 1);
        if is_free(x, y) {
            return Vec2 { x, y };
        }
    }

    let (x, y) = FALLBACK_SPAWN;
    Vec2 { x, y }
}
