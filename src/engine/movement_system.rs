use crate::constants::MOVE_COOLDOWN_MS;
use crate::types::PlayerView;
use crate::world::is_wall;

use super::utils::offset;

/// Advances one player by at most one cell. Returns whether the player moved.
///
/// Stunned players and players still inside the move cooldown stay put, as do
/// players with no key held or whose chosen neighbour is a wall. Movement
/// speed is therefore bounded by the cooldown, not by the tick rate.
pub fn step_player(player: &mut PlayerView, now_ms: u64) -> bool {
    if player.is_stunned(now_ms) {
        return false;
    }
    if now_ms.saturating_sub(player.last_move_at) < MOVE_COOLDOWN_MS {
        return false;
    }
    let Some(dir) = player.input.resolve() else {
        return false;
    };

    let (nx, ny) = offset(player.cx, player.cy, dir);
    if is_wall(nx, ny) {
        return false;
    }

    player.cx = nx;
    player.cy = ny;
    player.dir = dir.heading();
    player.last_move_at = now_ms;
    true
}
