// Error taxonomy for the harmonization core.
//
// Every error is raised synchronously at the point of violation and is
// never retried. The search only recombines chords that already passed
// validation when the pool was built, so it cannot generate invalid states
// internally; a failure here means malformed external input or
// misconfiguration, and the caller should treat it as fatal for that
// invocation. There is no partial-result recovery.

use crate::chord::ChordQuality;
use thiserror::Error;

/// Errors produced by the harmonization core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HarmonyError {
    /// A pitch fell outside the MIDI range during note construction or
    /// octave transposition. Out-of-range pitches are never clamped.
    #[error("pitch {0} is outside the MIDI range 0-127")]
    PitchOutOfRange(i32),

    /// The tonic literal was not one of the 12 canonical sharp names.
    #[error("unknown tonic literal '{0}'")]
    UnknownTonicLiteral(String),

    /// Appending to a bar would exceed its fixed tick capacity.
    #[error("bar overflow: {length} + {added} ticks exceeds capacity {capacity}")]
    BarOverflow {
        length: u32,
        added: u32,
        capacity: u32,
    },

    /// The survivor count must fit inside the population.
    #[error("selection factor {selection_factor} exceeds population size {population_size}")]
    SelectionExceedsPopulation {
        selection_factor: usize,
        population_size: usize,
    },

    /// Crossover draws two distinct parents, so at least two survivors
    /// must be kept each generation.
    #[error("selection factor {0} is too small, at least 2 survivors are required")]
    SelectionTooSmall(usize),

    /// The chord quality does not support inversion.
    #[error("{0:?} triads are not invertible")]
    NotInvertible(ChordQuality),
}
