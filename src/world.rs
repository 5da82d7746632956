use crate::types::{MapView, Vec2};

pub const GRID_COLS: i32 = 21;
pub const GRID_ROWS: i32 = 15;

const WALL: u8 = b'1';

/// Static maze layout, `1` = wall, `0` = floor. Renderers run their own wall
/// checks against this exact layout, served from `/api/map`.
pub const MAP: [&str; GRID_ROWS as usize] = [
    "111111111111111111111",
    "100000000010000000001",
    "101111011010110111101",
    "100000010000010000001",
    "101111010111010111101",
    "100000010010010000001",
    "111011111010111110111",
    "100010000000000010001",
    "101010111111111010101",
    "101010000010000010101",
    "101011111010111110101",
    "100000000000000000001",
    "101111011111110111101",
    "100000000010000000001",
    "111111111111111111111",
];

pub fn in_bounds(x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && x < GRID_COLS && y < GRID_ROWS
}

/// True for every coordinate outside the grid and for every wall cell.
pub fn is_wall(x: i32, y: i32) -> bool {
    if !in_bounds(x, y) {
        return true;
    }
    MAP[y as usize].as_bytes()[x as usize] == WALL
}

pub fn is_walkable(x: i32, y: i32) -> bool {
    !is_wall(x, y)
}

/// Dense row-major index of an in-bounds cell.
pub fn cell_index(x: i32, y: i32) -> Option<usize> {
    if !in_bounds(x, y) {
        return None;
    }
    Some((y * GRID_COLS + x) as usize)
}

pub fn cell_count() -> usize {
    (GRID_COLS * GRID_ROWS) as usize
}

pub fn key_of(x: i32, y: i32) -> String {
    format!("{x},{y}")
}

pub fn floor_cells() -> Vec<Vec2> {
    let mut out = Vec::new();
    for y in 0..GRID_ROWS {
        for x in 0..GRID_COLS {
            if is_walkable(x, y) {
                out.push(Vec2 { x, y });
            }
        }
    }
    out
}

/// One spot near each corner, inset by one cell.
pub fn power_spots() -> [Vec2; 4] {
    [
        Vec2 { x: 1, y: 1 },
        Vec2 {
            x: GRID_COLS - 2,
            y: 1,
        },
        Vec2 {
            x: 1,
            y: GRID_ROWS - 2,
        },
        Vec2 {
            x: GRID_COLS - 2,
            y: GRID_ROWS - 2,
        },
    ]
}

pub fn to_map_view() -> MapView {
    MapView {
        width: GRID_COLS,
        height: GRID_ROWS,
        tiles: MAP.iter().map(|row| row.to_string()).collect(),
    }
}
