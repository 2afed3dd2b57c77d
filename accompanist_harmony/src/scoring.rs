// Fitness scoring: how well a chord supports a bar, and a progression a
// melody.
//
// Two layers, both deterministic integer arithmetic with no randomness:
//
// Chord layer: voicing preferences (root position over inversions, plain
//   triads over diminished), key reinforcement (membership in the perfect
//   subset), melodic agreement (pitch-class matches, weighted toward the
//   earlier notes of the bar), and a heavy consonance gate on the closest
//   pitch-class distance between chord and melody.
// Progression layer: the chord scores, scaled; per-chord mode agreement;
//   smooth voice leading between adjacent chord tops; and a prohibitive
//   penalty on repeating the previous chord.
//
// All magnitudes live in FitnessWeights so callers can retune the search
// without touching the formula's shape. Most weights apply symmetrically:
// the same magnitude is added as a bonus when a property holds and
// subtracted as a penalty when it does not.

use crate::chord::{Chord, ChordQuality};
use crate::key::ChordPool;
use crate::melody::{Bar, Melody};
use crate::progression::Progression;
use serde::{Deserialize, Serialize};

/// Tunable weights for both scoring layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessWeights {
    // Chord layer.
    /// Applied against inverted voicings, for root positions.
    pub inversion_weight: i64,
    /// Applied against diminished triads, for major/minor ones.
    pub diminished_weight: i64,
    /// Membership in the pool's perfect subset.
    pub perfect_chord_weight: i64,
    /// Chord tones poking above the bar's melody pitch classes.
    pub voicing_weight: i64,
    /// Per pitch-class match between a chord tone and a bar note, scaled
    /// by `3 - bar note index` so earlier melody notes count more.
    pub pitch_class_match_weight: i64,
    /// The consonance gate: any chord/melody pitch-class distance landing
    /// in `dissonant_distances` flips this from bonus to penalty.
    pub dissonance_weight: i64,
    /// Dissonant pitch-class distances, after folding onto 0..=6.
    pub dissonant_distances: Vec<u8>,

    // Progression layer.
    /// Multiplier on each chord's own fitness.
    pub chord_fitness_factor: i64,
    /// Bonus when a chord's quality matches the key mode.
    pub mode_match_bonus: i64,
    /// Penalty when it does not.
    pub mode_mismatch_penalty: i64,
    /// Largest comfortable distance between adjacent chords' top pitches.
    pub preferred_leap: u8,
    /// Applied for smooth adjacent voice leading, against leaps.
    pub leap_weight: i64,
    /// Penalty for repeating the previous chord verbatim.
    pub repetition_penalty: i64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        FitnessWeights {
            inversion_weight: 400,
            diminished_weight: 400,
            perfect_chord_weight: 600,
            voicing_weight: 10_000,
            pitch_class_match_weight: 600,
            dissonance_weight: 100_000,
            dissonant_distances: vec![0, 1, 2, 6],

            chord_fitness_factor: 10,
            mode_match_bonus: 7,
            mode_mismatch_penalty: 1_000,
            preferred_leap: 5,
            leap_weight: 1_000_000,
            repetition_penalty: 100_000_000,
        }
    }
}

impl FitnessWeights {
    /// Pitch-class distance folded onto 0..=6: the shorter way around the
    /// circle of semitones.
    fn folded_distance(a: u8, b: u8) -> u8 {
        let direct = a.abs_diff(b);
        direct.min(12 - direct)
    }

    fn is_dissonant(&self, a: u8, b: u8) -> bool {
        self.dissonant_distances
            .contains(&Self::folded_distance(a, b))
    }
}

impl Chord {
    /// Score this chord against one bar of the melody. Deterministic:
    /// equal inputs always produce equal scores.
    pub fn fitness(&self, pool: &ChordPool, bar: &Bar, weights: &FitnessWeights) -> i64 {
        let mut value = if self.is_inverted() {
            -weights.inversion_weight
        } else {
            weights.inversion_weight
        };

        value += if self.quality() == ChordQuality::Diminished {
            -weights.diminished_weight
        } else {
            weights.diminished_weight
        };

        value += if pool.is_perfect(self) {
            weights.perfect_chord_weight
        } else {
            -weights.perfect_chord_weight
        };

        let too_high = self.notes().iter().any(|tone| {
            bar.notes()
                .iter()
                .any(|melody_note| tone.pitch_class() > melody_note.pitch_class())
        });
        value += if too_high {
            -weights.voicing_weight
        } else {
            weights.voicing_weight
        };

        let slots = self.notes().len() as i64;
        for tone in self.notes() {
            for (index, melody_note) in bar.notes().iter().enumerate() {
                if tone == melody_note {
                    value += weights.pitch_class_match_weight * (slots - index as i64);
                }
            }
        }

        let dissonant = bar.notes().iter().any(|melody_note| {
            self.notes()
                .iter()
                .any(|tone| weights.is_dissonant(melody_note.pitch_class(), tone.pitch_class()))
        });
        value += if dissonant {
            -weights.dissonance_weight
        } else {
            weights.dissonance_weight
        };

        value
    }
}

impl Progression {
    /// Score the whole progression against the melody. Deterministic,
    /// like the chord layer it sums.
    pub fn fitness(&self, pool: &ChordPool, melody: &Melody, weights: &FitnessWeights) -> i64 {
        let mut value = 0;
        let mut previous: Option<&Chord> = None;

        for (chord, bar) in self.chords().iter().zip(melody.bars()) {
            value += chord.fitness(pool, bar, weights) * weights.chord_fitness_factor;

            value += if chord.quality() == pool.mode().quality() {
                weights.mode_match_bonus
            } else {
                -weights.mode_mismatch_penalty
            };

            if let Some(previous) = previous {
                let leap = previous.max_value().abs_diff(chord.max_value());
                value += if leap <= weights.preferred_leap {
                    weights.leap_weight
                } else {
                    -weights.leap_weight
                };

                if chord == previous {
                    value -= weights.repetition_penalty;
                }
            }

            previous = Some(chord);
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Mode;
    use crate::note::Note;

    fn fixture() -> (ChordPool, Melody) {
        let notes = vec![
            Note::new(60, 0, 384).unwrap(),
            Note::new(64, 0, 384).unwrap(),
        ];
        let melody = Melody::new(notes).unwrap();
        let pool = ChordPool::new(&melody, "C", Mode::Major, false).unwrap();
        (pool, melody)
    }

    #[test]
    fn test_chord_fitness_is_deterministic() {
        let (pool, melody) = fixture();
        let weights = FitnessWeights::default();
        let chord = &pool.chords()[0];
        let bar = &melody.bars()[0];

        assert_eq!(
            chord.fitness(&pool, bar, &weights),
            chord.fitness(&pool, bar, &weights)
        );
    }

    #[test]
    fn test_tonic_outscores_leading_tone_triad() {
        let (pool, melody) = fixture();
        let weights = FitnessWeights::default();
        let bar = &melody.bars()[0];

        let tonic = &pool.chords()[0];
        let diminished = &pool.chords()[6];
        assert!(tonic.fitness(&pool, bar, &weights) > diminished.fitness(&pool, bar, &weights));
    }

    #[test]
    fn test_folded_distance() {
        assert_eq!(FitnessWeights::folded_distance(0, 0), 0);
        assert_eq!(FitnessWeights::folded_distance(0, 7), 5);
        assert_eq!(FitnessWeights::folded_distance(11, 0), 1);
        assert_eq!(FitnessWeights::folded_distance(2, 8), 6);
    }

    #[test]
    fn test_repetition_is_penalized() {
        let (pool, melody) = fixture();
        let weights = FitnessWeights::default();

        let tonic = pool.chords()[0].clone();
        let dominant = pool.chords()[4].clone();

        let static_harmony = Progression::new(vec![tonic.clone(), tonic.clone()]);
        let moving_harmony = Progression::new(vec![tonic, dominant]);

        assert!(
            moving_harmony.fitness(&pool, &melody, &weights)
                > static_harmony.fitness(&pool, &melody, &weights)
        );
    }

    #[test]
    fn test_weights_survive_a_serde_round_trip() {
        let weights = FitnessWeights::default();
        let json = serde_json::to_string(&weights).unwrap();
        let restored: FitnessWeights = serde_json::from_str(&json).unwrap();

        assert_eq!(weights.dissonance_weight, restored.dissonance_weight);
        assert_eq!(weights.dissonant_distances, restored.dissonant_distances);
        assert_eq!(weights.repetition_penalty, restored.repetition_penalty);
    }
}
