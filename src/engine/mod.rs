use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{palette_color, MAX_PLAYERS, POWER_DURATION_MS};
use crate::pellets::PelletField;
use crate::rng::Rng;
use crate::types::{Heading, InputState, PlayerView, Snapshot, Vec2};

mod collision_system;
mod movement_system;
mod spawn_system;
mod utils;

pub use self::movement_system::step_player;
pub use self::utils::now_ms;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("room is full")]
    RoomFull,
    #[error("player {0} already joined")]
    AlreadyJoined(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Departure {
    /// No player was bound to that identity.
    Unknown,
    Left,
    /// The last player left and a fresh match was set up.
    MatchReset,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub pellets: u32,
    pub power_pellets: u32,
    pub hits_landed: u32,
    pub hits_taken: u32,
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    view: PlayerView,
    stats: PlayerStats,
}

/// Authoritative match state. Players live in fixed slots so "player one" and
/// "player two" never depend on map iteration order.
#[derive(Clone, Debug)]
pub struct GameEngine {
    rng: Rng,
    slots: [Option<PlayerInternal>; MAX_PLAYERS],
    pellets: PelletField,
    last_winner: Option<String>,
    message: Option<String>,
    server_time: u64,
}

impl GameEngine {
    pub fn new(seed: u32) -> Self {
        Self::with_rng(Rng::new(seed))
    }

    pub fn with_rng(rng: Rng) -> Self {
        Self {
            rng,
            slots: Default::default(),
            pellets: PelletField::initialize(),
            last_winner: None,
            message: None,
            server_time: 0,
        }
    }

    pub fn player_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_full(&self) -> bool {
        self.player_count() >= MAX_PLAYERS
    }

    pub fn has_player(&self, id: &str) -> bool {
        self.slot_of(id).is_some()
    }

    pub fn player(&self, id: &str) -> Option<&PlayerView> {
        self.slot_of(id)
            .and_then(|slot| self.slots[slot].as_ref())
            .map(|player| &player.view)
    }

    pub fn player_stats(&self, id: &str) -> Option<&PlayerStats> {
        self.slot_of(id)
            .and_then(|slot| self.slots[slot].as_ref())
            .map(|player| &player.stats)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerView> {
        self.slots.iter().flatten().map(|player| &player.view)
    }

    pub fn pellets(&self) -> &PelletField {
        &self.pellets
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn last_winner(&self) -> Option<&str> {
        self.last_winner.as_deref()
    }

    pub fn server_time(&self) -> u64 {
        self.server_time
    }

    /// Seats a new player in the first free slot. Returns the slot index.
    pub fn admit(&mut self, id: &str, now_ms: u64) -> Result<usize, JoinError> {
        self.seat(id, now_ms, Self::pick_spawn_position)
    }

    fn seat(
        &mut self,
        id: &str,
        now_ms: u64,
        pick_spawn: impl FnOnce(&mut Self) -> Vec2,
    ) -> Result<usize, JoinError> {
        if self.has_player(id) {
            return Err(JoinError::AlreadyJoined(id.to_string()));
        }
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return Err(JoinError::RoomFull);
        };

        let spawn = pick_spawn(self);
        self.slots[slot] = Some(PlayerInternal {
            view: PlayerView {
                id: id.to_string(),
                cx: spawn.x,
                cy: spawn.y,
                dir: Heading::default(),
                input: InputState::default(),
                score: 0,
                color: palette_color(slot).to_string(),
                power_until: 0,
                stunned_until: 0,
                last_move_at: 0,
            },
            stats: PlayerStats::default(),
        });
        self.server_time = now_ms;
        info!(player = id, slot, x = spawn.x, y = spawn.y, "player admitted");
        Ok(slot)
    }

    /// Replaces the held keys of a seated player. Unknown ids are ignored.
    pub fn set_input(&mut self, id: &str, input: InputState) -> bool {
        let Some(slot) = self.slot_of(id) else {
            return false;
        };
        let Some(player) = self.slots[slot].as_mut() else {
            return false;
        };
        player.view.input = input;
        true
    }

    pub fn remove_player(&mut self, id: &str, now_ms: u64) -> Departure {
        let Some(slot) = self.slot_of(id) else {
            return Departure::Unknown;
        };
        self.slots[slot] = None;
        self.message = None;
        self.last_winner = None;
        self.server_time = now_ms;
        info!(player = id, slot, "player left");

        if self.player_count() == 0 {
            self.reset_match();
            info!("room empty, match reset");
            return Departure::MatchReset;
        }
        Departure::Left
    }

    /// One simulation tick: movement, pickups, then the collision check.
    pub fn step(&mut self, now_ms: u64) {
        self.server_time = now_ms;

        for player in self.slots.iter_mut().flatten() {
            step_player(&mut player.view, now_ms);

            let pickup = self.pellets.consume(player.view.cx, player.view.cy);
            player.view.score += pickup.score_delta;
            if pickup.power_granted {
                player.view.power_until = now_ms + POWER_DURATION_MS;
                player.stats.power_pellets += 1;
                debug!(player = %player.view.id, until = player.view.power_until, "power window started");
            } else if pickup.score_delta > 0 {
                player.stats.pellets += 1;
            }
        }

        self.resolve_collisions(now_ms);
    }

    pub fn build_snapshot(&self) -> Snapshot {
        let users: BTreeMap<String, PlayerView> = self
            .players()
            .map(|view| (view.id.clone(), view.clone()))
            .collect();
        Snapshot {
            users,
            pellets: self.pellets.pellet_map(),
            power_pellets: self.pellets.power_pellet_map(),
            last_winner: self.last_winner.clone(),
            message: self.message.clone(),
            server_time: self.server_time,
        }
    }

    fn reset_match(&mut self) {
        self.slots = Default::default();
        self.pellets = PelletField::initialize();
        self.last_winner = None;
        self.message = None;
    }

    fn slot_of(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .map(|player| player.view.id == id)
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{POWER_HIT_MESSAGE, STUN_DURATION_MS};
    use crate::engine::{Departure, GameEngine, JoinError};
    use crate::pellets::PelletField;
    use crate::types::InputState;
    use crate::world::is_walkable;

    fn engine_with_two() -> GameEngine {
        let mut engine = GameEngine::new(1234);
        engine.admit("p1", 0).expect("first seat");
        engine.admit("p2", 0).expect("second seat");
        engine
    }

    fn place(engine: &mut GameEngine, slot: usize, x: i32, y: i32) {
        let player = engine.slots[slot].as_mut().expect("occupied slot");
        player.view.cx = x;
        player.view.cy = y;
    }

    fn right() -> InputState {
        InputState {
            right: true,
            ..InputState::default()
        }
    }

    #[test]
    fn third_player_is_rejected() {
        let mut engine = engine_with_two();
        assert_eq!(engine.admit("p3", 0), Err(JoinError::RoomFull));
        assert_eq!(engine.player_count(), 2);
        assert!(engine.player("p3").is_none());
    }

    #[test]
    fn duplicate_admission_is_rejected() {
        let mut engine = GameEngine::new(1);
        engine.admit("p1", 0).expect("seat");
        assert_eq!(
            engine.admit("p1", 0),
            Err(JoinError::AlreadyJoined("p1".to_string()))
        );
    }

    #[test]
    fn admitted_players_start_clean_on_distinct_floor_cells() {
        let engine = engine_with_two();
        let p1 = engine.player("p1").expect("p1");
        let p2 = engine.player("p2").expect("p2");
        assert_ne!((p1.cx, p1.cy), (p2.cx, p2.cy));
        for player in [p1, p2] {
            assert!(is_walkable(player.cx, player.cy));
            assert_eq!(player.score, 0);
            assert_eq!(player.power_until, 0);
            assert_eq!(player.stunned_until, 0);
            assert_eq!(player.last_move_at, 0);
            assert_eq!(player.input, InputState::default());
            assert_eq!((player.dir.dx, player.dir.dy), (1, 0));
        }
        assert_eq!(p1.color, "#FFD000");
        assert_eq!(p2.color, "#00D6FF");
    }

    #[test]
    fn freed_slot_is_reused_with_its_color() {
        let mut engine = engine_with_two();
        assert_eq!(engine.remove_player("p1", 10), Departure::Left);
        assert_eq!(engine.admit("p3", 20), Ok(0));
        assert_eq!(engine.player("p3").expect("p3").color, "#FFD000");
    }

    #[test]
    fn input_for_unknown_player_is_ignored() {
        let mut engine = engine_with_two();
        assert!(!engine.set_input("ghost", right()));
        assert!(engine.set_input("p1", right()));
        assert_eq!(engine.player("p1").expect("p1").input, right());
    }

    #[test]
    fn tick_moves_then_collects_pellet() {
        let mut engine = engine_with_two();
        place(&mut engine, 0, 2, 1);
        place(&mut engine, 1, 5, 3);
        engine.pellets.consume(2, 1);
        engine.set_input("p1", right());
        engine.step(1_000);
        let p1 = engine.player("p1").expect("p1");
        assert_eq!((p1.cx, p1.cy), (3, 1));
        assert_eq!(p1.score, 1);
        assert!(!engine.pellets.has_pellet(3, 1));
        assert_eq!(engine.server_time(), 1_000);
    }

    #[test]
    fn power_pellet_opens_six_second_window() {
        let mut engine = engine_with_two();
        place(&mut engine, 0, 1, 1);
        place(&mut engine, 1, 5, 3);
        engine.step(5_000);
        let p1 = engine.player("p1").expect("p1");
        assert_eq!(p1.score, 3);
        assert_eq!(p1.power_until, 11_000);
        assert!(p1.is_powered(10_999));
        assert!(!p1.is_powered(11_000));
    }

    #[test]
    fn powered_attacker_steals_stuns_and_scatters() {
        let mut engine = engine_with_two();
        let now = 50_000;
        place(&mut engine, 0, 1, 1);
        // Clear the neighbourhood so scattered pellets are observable.
        for y in 0..=3 {
            for x in 0..=3 {
                engine.pellets.consume(x, y);
            }
        }
        {
            let victim = engine.slots[0].as_mut().expect("p1");
            victim.view.score = 9;
            let attacker = engine.slots[1].as_mut().expect("p2");
            attacker.view.cx = 2;
            attacker.view.cy = 1;
            attacker.view.power_until = now + 3_000;
            attacker.view.input = InputState {
                left: true,
                ..InputState::default()
            };
        }

        engine.step(now);

        let p1 = engine.player("p1").expect("p1");
        let p2 = engine.player("p2").expect("p2");
        assert_eq!((p2.cx, p2.cy), (1, 1));
        assert_eq!(p1.score, 4);
        assert_eq!(p1.stunned_until, now + STUN_DURATION_MS);
        assert_eq!(engine.message(), Some(POWER_HIT_MESSAGE));
        assert_eq!(engine.last_winner(), Some("p2"));

        let scattered = (-1..=3)
            .flat_map(|y| (-1..=3).map(move |x| (x, y)))
            .filter(|(x, y)| engine.pellets.has_pellet(*x, *y))
            .count();
        assert_eq!(scattered, 5);
        assert_eq!(engine.player_stats("p2").expect("stats").hits_landed, 1);
        assert_eq!(engine.player_stats("p1").expect("stats").hits_taken, 1);
    }

    #[test]
    fn low_score_victim_floors_at_zero() {
        let mut engine = engine_with_two();
        place(&mut engine, 0, 5, 3);
        place(&mut engine, 1, 5, 3);
        engine.pellets.consume(5, 3);
        {
            let victim = engine.slots[1].as_mut().expect("p2");
            victim.view.score = 1;
            let attacker = engine.slots[0].as_mut().expect("p1");
            attacker.view.power_until = 99_000;
        }
        engine.step(1_000);
        assert_eq!(engine.player("p2").expect("p2").score, 0);
        assert_eq!(engine.last_winner(), Some("p1"));
    }

    #[test]
    fn neutral_overlap_changes_nothing_and_clears_banner() {
        let mut engine = engine_with_two();
        place(&mut engine, 0, 5, 3);
        place(&mut engine, 1, 5, 3);
        engine.pellets.consume(5, 3);
        engine.message = Some("stale".to_string());
        engine.last_winner = Some("p1".to_string());
        for slot in 0..2 {
            let player = engine.slots[slot].as_mut().expect("seat");
            player.view.score = 7;
            player.view.power_until = 9_000;
        }
        let pellets_before = engine.pellets.clone();

        engine.step(1_000);

        for id in ["p1", "p2"] {
            let player = engine.player(id).expect("seat");
            assert_eq!(player.score, 7);
            assert_eq!(player.stunned_until, 0);
        }
        assert_eq!(engine.pellets, pellets_before);
        assert_eq!(engine.message(), None);
        assert_eq!(engine.last_winner(), None);
    }

    #[test]
    fn separate_cells_clear_banner_each_tick() {
        let mut engine = engine_with_two();
        place(&mut engine, 0, 5, 3);
        place(&mut engine, 1, 3, 3);
        engine.message = Some("stale".to_string());
        engine.last_winner = Some("p1".to_string());
        engine.step(1_000);
        assert_eq!(engine.message(), None);
        assert_eq!(engine.last_winner(), None);
    }

    #[test]
    fn single_player_leaves_banner_untouched() {
        let mut engine = GameEngine::new(5);
        engine.admit("p1", 0).expect("seat");
        engine.message = Some("kept".to_string());
        engine.step(1_000);
        assert_eq!(engine.message(), Some("kept"));
    }

    #[test]
    fn departure_clears_banner_and_last_leaver_resets_match() {
        let mut engine = engine_with_two();
        place(&mut engine, 0, 2, 1);
        engine.step(1_000);
        engine.message = Some("POWER HIT!".to_string());
        engine.last_winner = Some("p2".to_string());

        assert_eq!(engine.remove_player("p2", 1_100), Departure::Left);
        assert_eq!(engine.message(), None);
        assert_eq!(engine.last_winner(), None);
        assert_ne!(engine.pellets, PelletField::initialize());

        assert_eq!(engine.remove_player("p1", 1_200), Departure::MatchReset);
        assert_eq!(engine.player_count(), 0);
        assert_eq!(engine.pellets, PelletField::initialize());
        assert_eq!(engine.remove_player("p1", 1_300), Departure::Unknown);
    }

    #[test]
    fn snapshot_keys_players_by_identity() {
        let engine = engine_with_two();
        let snapshot = engine.build_snapshot();
        assert_eq!(snapshot.users.len(), 2);
        assert!(snapshot.users.contains_key("p1"));
        assert!(snapshot.users.contains_key("p2"));
        assert_eq!(snapshot.power_pellets.len(), 4);
        assert_eq!(snapshot.message, None);
    }

    #[test]
    fn same_seed_produces_same_spawns() {
        let a = engine_with_two();
        let b = engine_with_two();
        for id in ["p1", "p2"] {
            let pa = a.player(id).expect("seat");
            let pb = b.player(id).expect("seat");
            assert_eq!((pa.cx, pa.cy), (pb.cx, pb.cy));
        }
    }
}
