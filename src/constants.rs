pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const MAX_PLAYERS: usize = 2;

pub const MOVE_COOLDOWN_MS: u64 = 110;
pub const POWER_DURATION_MS: u64 = 6_000;
pub const STUN_DURATION_MS: u64 = 1_200;

pub const NORMAL_PELLET_SCORE: u32 = 1;
pub const POWER_PELLET_SCORE: u32 = 3;

/// Chebyshev radius of the square pellets are scattered into after a power hit.
pub const SCATTER_RADIUS: i32 = 2;
pub const STEAL_CAP: u32 = 6;

pub const SPAWN_ATTEMPTS: usize = 2_000;
pub const FALLBACK_SPAWN: (i32, i32) = (1, 1);

pub const PLAYER_PALETTE: [&str; 2] = ["#FFD000", "#00D6FF"];
pub const POWER_HIT_MESSAGE: &str = "POWER HIT!";

pub fn steal_amount(victim_score: u32) -> u32 {
    (victim_score / 3 + 2).min(STEAL_CAP)
}

pub fn palette_color(join_index: usize) -> &'static str {
    PLAYER_PALETTE[join_index % PLAYER_PALETTE.len()]
}
