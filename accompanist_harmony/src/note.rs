// The Note value type: a single pitched time interval.
//
// Notes are immutable values. Octave transposition produces a new Note,
// and melody segmentation re-emits fresh sub-notes instead of editing in
// place.
//
// Equality is deliberately octave-insensitive: two notes compare equal
// exactly when their pitch classes match, whatever their registers. This
// lets chord tones and melody notes be compared for harmonic function
// without caring where either sounds. Code that needs full structural
// comparison must compare `value()` explicitly.

use crate::error::HarmonyError;
use serde::{Deserialize, Serialize};

/// Highest valid MIDI pitch.
pub const MIDI_MAX: u8 = 127;

/// Semitones per octave.
pub const SEMITONES: u8 = 12;

/// The 12 canonical pitch-class names, sharp spelling, indexed by pitch class.
pub const SHARP_LITERALS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A pitched time interval: a MIDI pitch, the silence before it sounds,
/// and its sounding length, both in ticks.
///
/// The unsigned fields make negative delays and durations unrepresentable;
/// the only runtime validation construction needs is the MIDI pitch bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Note {
    value: u8,
    start_delay: u32,
    duration: u32,
}

impl Note {
    /// Create a note. Fails if the pitch exceeds the MIDI range.
    pub fn new(value: u8, start_delay: u32, duration: u32) -> Result<Self, HarmonyError> {
        if value > MIDI_MAX {
            return Err(HarmonyError::PitchOutOfRange(i32::from(value)));
        }
        Ok(Note {
            value,
            start_delay,
            duration,
        })
    }

    /// MIDI pitch, 0-127.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Silence before the note sounds, in ticks.
    pub fn start_delay(&self) -> u32 {
        self.start_delay
    }

    /// Sounding length, in ticks.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Pitch class 0-11, C = 0.
    pub fn pitch_class(&self) -> u8 {
        self.value % SEMITONES
    }

    /// Octave number in the MIDI naming convention (C4 = 60).
    pub fn octave(&self) -> i8 {
        (i16::from(self.value) - 12).div_euclid(12) as i8
    }

    /// Total ticks the note occupies: leading silence plus sounding length.
    pub fn span(&self) -> u32 {
        self.start_delay + self.duration
    }

    /// A copy shifted by whole octaves, timing unchanged. The shift is
    /// never clamped: leaving the MIDI range is an error.
    pub fn change_octave(&self, factor: i32) -> Result<Self, HarmonyError> {
        let shifted = i32::from(self.value) + 12 * factor;
        let value =
            u8::try_from(shifted).map_err(|_| HarmonyError::PitchOutOfRange(shifted))?;
        Note::new(value, self.start_delay, self.duration)
    }

    /// Sharp-spelling name of this note's pitch class.
    pub fn literal(&self) -> &'static str {
        SHARP_LITERALS[usize::from(self.pitch_class())]
    }
}

/// Octave-insensitive equality: notes compare by pitch class alone, so
/// Note(60) == Note(72). See the module docs before relying on this.
impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.pitch_class() == other.pitch_class()
    }
}

impl Eq for Note {}

/// Look up a pitch class by its sharp-spelling literal.
pub fn pitch_class_of(literal: &str) -> Result<u8, HarmonyError> {
    SHARP_LITERALS
        .iter()
        .position(|&name| name == literal)
        .map(|index| index as u8)
        .ok_or_else(|| HarmonyError::UnknownTonicLiteral(literal.to_string()))
}
