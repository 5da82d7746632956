use std::collections::BTreeMap;

use crate::constants::{NORMAL_PELLET_SCORE, POWER_PELLET_SCORE};
use crate::rng::Rng;
use crate::types::Vec2;
use crate::world::{cell_count, cell_index, floor_cells, is_walkable, key_of, power_spots};

/// Result of a player standing on a cell for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pickup {
    pub score_delta: u32,
    pub power_granted: bool,
}

/// Dense per-cell pickup flags. A cell never holds both kinds at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PelletField {
    normal: Vec<bool>,
    power: Vec<bool>,
}

impl PelletField {
    pub fn initialize() -> Self {
        let mut field = Self {
            normal: vec![false; cell_count()],
            power: vec![false; cell_count()],
        };
        for cell in floor_cells() {
            field.set_normal(cell.x, cell.y, true);
        }
        for spot in power_spots() {
            let Some(idx) = cell_index(spot.x, spot.y) else {
                continue;
            };
            if !is_walkable(spot.x, spot.y) {
                continue;
            }
            field.normal[idx] = false;
            field.power[idx] = true;
        }
        field
    }

    pub fn has_pellet(&self, x: i32, y: i32) -> bool {
        cell_index(x, y).is_some_and(|idx| self.normal[idx])
    }

    pub fn has_power_pellet(&self, x: i32, y: i32) -> bool {
        cell_index(x, y).is_some_and(|idx| self.power[idx])
    }

    pub fn pellet_count(&self) -> usize {
        self.normal.iter().filter(|flag| **flag).count()
    }

    pub fn power_pellet_count(&self) -> usize {
        self.power.iter().filter(|flag| **flag).count()
    }

    pub fn consume(&mut self, x: i32, y: i32) -> Pickup {
        let Some(idx) = cell_index(x, y) else {
            return Pickup::default();
        };
        let mut pickup = Pickup::default();
        if self.normal[idx] {
            self.normal[idx] = false;
            pickup.score_delta += NORMAL_PELLET_SCORE;
        }
        if self.power[idx] {
            self.power[idx] = false;
            pickup.score_delta += POWER_PELLET_SCORE;
            pickup.power_granted = true;
        }
        pickup
    }

    /// Drops up to `count` normal pellets on distinct floor cells within
    /// `radius` of the centre. Power-pellet cells keep their power pellet.
    /// Returns the cells that were chosen.
    pub fn scatter(
        &mut self,
        center_x: i32,
        center_y: i32,
        radius: i32,
        count: u32,
        rng: &mut Rng,
    ) -> Vec<Vec2> {
        let mut spots = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let x = center_x + dx;
                let y = center_y + dy;
                if is_walkable(x, y) {
                    spots.push(Vec2 { x, y });
                }
            }
        }

        let chosen = rng.sample_distinct(&spots, count as usize);
        for spot in &chosen {
            if !self.has_power_pellet(spot.x, spot.y) {
                self.set_normal(spot.x, spot.y, true);
            }
        }
        chosen
    }

    /// Wire form: every floor cell keyed `"x,y"`.
    pub fn pellet_map(&self) -> BTreeMap<String, bool> {
        floor_cells()
            .into_iter()
            .map(|cell| (key_of(cell.x, cell.y), self.has_pellet(cell.x, cell.y)))
            .collect()
    }

    /// Wire form: every designated power spot that sits on floor.
    pub fn power_pellet_map(&self) -> BTreeMap<String, bool> {
        power_spots()
            .into_iter()
            .filter(|spot| is_walkable(spot.x, spot.y))
            .map(|spot| (key_of(spot.x, spot.y), self.has_power_pellet(spot.x, spot.y)))
            .collect()
    }

    fn set_normal(&mut self, x: i32, y: i32, value: bool) {
        if let Some(idx) = cell_index(x, y) {
            self.normal[idx] = value;
        }
    }
}

impl Default for PelletField {
    fn default() -> Self {
        Self::initialize()
    }
}
