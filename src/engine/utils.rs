use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Direction;

pub fn now_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    now as u64
}

pub(super) fn offset(x: i32, y: i32, dir: Direction) -> (i32, i32) {
    let (dx, dy) = dir.delta();
    (x + dx, y + dy)
}
