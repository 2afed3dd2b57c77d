// Keys and the diatonic chord pool.
//
// The key itself is detected outside this crate; what arrives here is a
// tonic literal plus a mode. From those this module derives the seven
// diatonic triads via the fixed roman-numeral quality tables, optionally
// extends them with first/second inversions, and keeps aside the "perfect"
// subset whose quality matches the key's own, which the scoring layer
// rewards.
//
// The step and quality tables are `[_; 7]` arrays returned from exhaustive
// matches, so they cannot fall out of alignment.

use crate::chord::{Chord, ChordQuality};
use crate::error::HarmonyError;
use crate::melody::Melody;
use crate::note::{self, Note};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key mode. The scale steps and degree qualities hang off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Major,
    /// Natural minor.
    Minor,
}

impl Mode {
    /// Semitone steps of the seven scale degrees above the tonic.
    pub fn steps(self) -> [u8; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Roman-numeral quality of each scale-degree triad.
    pub fn degree_qualities(self) -> [ChordQuality; 7] {
        use ChordQuality::{Diminished, Major, Minor};
        match self {
            Mode::Major => [Major, Minor, Minor, Major, Major, Minor, Diminished],
            Mode::Minor => [Minor, Diminished, Major, Minor, Major, Major, Diminished],
        }
    }

    /// The triad quality that reinforces this mode.
    pub fn quality(self) -> ChordQuality {
        match self {
            Mode::Major => ChordQuality::Major,
            Mode::Minor => ChordQuality::Minor,
        }
    }

    /// Parse a mode name as an external key analysis reports it.
    pub fn from_name(name: &str) -> Option<Mode> {
        match name.to_lowercase().as_str() {
            "major" => Some(Mode::Major),
            "minor" => Some(Mode::Minor),
            _ => None,
        }
    }
}

/// Lowest octave the tonic register may use.
const TONIC_OCTAVE_FLOOR: i8 = 2;

/// How far below the melody's lowest octave the tonic sits.
const TONIC_OCTAVE_DROP: i8 = 1;

/// The harmonization candidates for one detected key: the diatonic triads
/// (plus optional inversions) and the perfect subset among them.
///
/// Built once per melody; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordPool {
    tonic: Note,
    mode: Mode,
    chords: Vec<Chord>,
    perfect_chords: Vec<Chord>,
}

impl ChordPool {
    /// Derive the pool for a melody in the given key.
    ///
    /// The tonic's register follows the melody's own lowest note, one
    /// octave down, bounded below so accompaniment never drops sub-audible.
    /// Chord durations equal the melody's bar capacity: one chord fills one
    /// bar. When `include_inversions` is set, first and second inversions
    /// of every non-diminished degree join the candidate list (and of every
    /// perfect chord, the perfect list).
    pub fn new(
        melody: &Melody,
        literal: &str,
        mode: Mode,
        include_inversions: bool,
    ) -> Result<Self, HarmonyError> {
        let pitch_class = note::pitch_class_of(literal)?;
        let min_octave = melody
            .notes()
            .iter()
            .map(Note::octave)
            .min()
            .unwrap_or(TONIC_OCTAVE_FLOOR + TONIC_OCTAVE_DROP);
        let register = (min_octave - TONIC_OCTAVE_DROP).max(TONIC_OCTAVE_FLOOR);

        let duration = melody.bar_capacity();
        let tonic = Note::new(pitch_class + 12 * register as u8, 0, duration)?;

        let mut chords = Vec::new();
        for (step, quality) in mode.steps().into_iter().zip(mode.degree_qualities()) {
            let degree_root = Note::new(tonic.value() + step, 0, duration)?;
            chords.push(Chord::new(degree_root, quality)?);
        }

        let mut perfect_chords: Vec<Chord> = chords
            .iter()
            .filter(|chord| chord.quality() == mode.quality())
            .cloned()
            .collect();

        if include_inversions {
            let firsts: Vec<Chord> = perfect_chords
                .iter()
                .map(Chord::first_inversion)
                .collect::<Result<_, _>>()?;
            let seconds: Vec<Chord> = perfect_chords
                .iter()
                .map(Chord::second_inversion)
                .collect::<Result<_, _>>()?;
            perfect_chords.extend(firsts);
            perfect_chords.extend(seconds);

            let invertible: Vec<Chord> = chords
                .iter()
                .filter(|chord| chord.quality() != ChordQuality::Diminished)
                .cloned()
                .collect();
            for chord in &invertible {
                chords.push(chord.first_inversion()?);
            }
            for chord in &invertible {
                chords.push(chord.second_inversion()?);
            }
        }

        Ok(ChordPool {
            tonic,
            mode,
            chords,
            perfect_chords,
        })
    }

    pub fn tonic(&self) -> &Note {
        &self.tonic
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// All harmonization candidates. The first seven are the diatonic
    /// triads in scale-degree order.
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// The candidates whose quality matches the key's own.
    pub fn perfect_chords(&self) -> &[Chord] {
        &self.perfect_chords
    }

    /// Membership test against the perfect subset (pitch-class equality).
    pub fn is_perfect(&self, chord: &Chord) -> bool {
        self.perfect_chords.iter().any(|perfect| perfect == chord)
    }
}

/// The human-readable key label: tonic literal, `m`-suffixed for minor.
/// Callers use it to name output artifacts.
impl fmt::Display for ChordPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{}", self.tonic.literal()),
            Mode::Minor => write!(f, "{}m", self.tonic.literal()),
        }
    }
}
