use tracing::debug;

use crate::constants::{steal_amount, POWER_HIT_MESSAGE, SCATTER_RADIUS, STUN_DURATION_MS};

use super::GameEngine;

impl GameEngine {
    /// Same-cell check between the two seated players. A powered player
    /// landing on an unpowered one steals score, stuns the victim and spills
    /// the stolen pellets around them. Any other outcome clears the banner.
    pub(super) fn resolve_collisions(&mut self, now_ms: u64) {
        let [Some(a), Some(b)] = &mut self.slots else {
            return;
        };

        if (a.view.cx, a.view.cy) != (b.view.cx, b.view.cy) {
            self.message = None;
            self.last_winner = None;
            return;
        }

        let (attacker, victim) = match (a.view.is_powered(now_ms), b.view.is_powered(now_ms)) {
            (true, false) => (a, b),
            (false, true) => (b, a),
            _ => {
                self.message = None;
                self.last_winner = None;
                return;
            }
        };

        let lost = steal_amount(victim.view.score);
        victim.view.score = victim.view.score.saturating_sub(lost);
        victim.view.stunned_until = now_ms + STUN_DURATION_MS;
        victim.stats.hits_taken += 1;
        attacker.stats.hits_landed += 1;

        let scattered = self.pellets.scatter(
            victim.view.cx,
            victim.view.cy,
            SCATTER_RADIUS,
            lost,
            &mut self.rng,
        );
        debug!(
            attacker = %attacker.view.id,
            victim = %victim.view.id,
            lost,
            scattered = scattered.len(),
            "power hit"
        );

        self.message = Some(POWER_HIT_MESSAGE.to_string());
        self.last_winner = Some(attacker.view.id.clone());
    }
}
