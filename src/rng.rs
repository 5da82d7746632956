use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng as _, SeedableRng};

/// Random source owned by a match. Spawn rolls and pellet scatter draw only
/// from here, so a fixed seed replays the same match.
#[derive(Clone, Debug)]
pub struct Rng {
    inner: StdRng,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            inner: StdRng::seed_from_u64(u64::from(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Uniform integer in `min..=max`. Returns `min` for an empty range.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    /// Up to `amount` distinct items, uniformly chosen without replacement.
    pub fn sample_distinct<T: Clone>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        let amount = amount.min(items.len());
        if amount == 0 {
            return Vec::new();
        }
        index::sample(&mut self.inner, items.len(), amount)
            .into_iter()
            .map(|idx| items[idx].clone())
            .collect()
    }
}
