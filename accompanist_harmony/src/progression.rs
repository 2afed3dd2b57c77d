// The evolutionary genome: one chord per bar.
//
// A progression has no identity beyond its chord sequence; individuals are
// freely cloned and recombined. Mutation takes the progression by value
// and returns it, which makes the in-place contract explicit in the
// signature and lets ownership rule out aliasing: a mutated individual can
// never share chords with another by mutable reference.
//
// Every stochastic operation draws from the caller's RNG, mirroring how
// the rest of the project threads randomness for reproducible runs.

use crate::chord::Chord;
use crate::key::ChordPool;
use crate::melody::Melody;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An ordered chord sequence, one chord per melody bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    chords: Vec<Chord>,
}

impl Progression {
    pub fn new(chords: Vec<Chord>) -> Self {
        Progression { chords }
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// Draw a uniformly random progression: one pool chord per melody bar.
    pub fn random(pool: &ChordPool, melody: &Melody, rng: &mut impl Rng) -> Self {
        let candidates = pool.chords();
        let chords = melody
            .bars()
            .iter()
            .map(|_| candidates[rng.random_range(0..candidates.len())].clone())
            .collect();
        Progression { chords }
    }

    /// Recombine two parents gene by gene. Each slot keeps `a`'s chord
    /// with probability `keep_prob`, otherwise takes `b`'s. The output
    /// length is the shorter parent's length. `keep_prob` of 1.0 or 0.0
    /// reproduces `a` or `b` exactly (truncated), with no randomness
    /// observable in the result.
    pub fn crossover(
        a: &Progression,
        b: &Progression,
        keep_prob: f64,
        rng: &mut impl Rng,
    ) -> Self {
        let length = a.chords.len().min(b.chords.len());
        let chords = (0..length)
            .map(|i| {
                if rng.random::<f64>() < keep_prob {
                    a.chords[i].clone()
                } else {
                    b.chords[i].clone()
                }
            })
            .collect();
        Progression { chords }
    }

    /// Swap mutation. With probability `invoke_prob` the progression is
    /// visited gene by gene; each gene is, independently with probability
    /// `1 - gene_prob`, exchanged with a uniformly random position. The
    /// chord multiset is preserved, only the ordering changes.
    pub fn mutate(mut self, invoke_prob: f64, gene_prob: f64, rng: &mut impl Rng) -> Self {
        if self.chords.is_empty() || rng.random::<f64>() >= invoke_prob {
            return self;
        }
        for i in 0..self.chords.len() {
            if rng.random::<f64>() > gene_prob {
                let j = rng.random_range(0..self.chords.len());
                self.chords.swap(i, j);
            }
        }
        self
    }
}
