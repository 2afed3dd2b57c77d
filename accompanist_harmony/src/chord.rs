// Triads: three notes built from a root and an interval pattern.
//
// ChordQuality is a closed enumeration acting as a discriminated union:
// each variant carries its fixed interval list through `intervals()`, and
// every use site matches exhaustively. A malformed pattern is
// unrepresentable, so triad construction only validates pitch range.
//
// Inversion never mutates: `first_inversion`/`second_inversion` return new
// chords with the slots reordered, keeping slot 0 as the lowest-intended
// voice. Diminished triads stay in root position.

use crate::error::HarmonyError;
use crate::note::Note;
use serde::{Deserialize, Serialize};

/// Triad quality: the interval pattern stacked on the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
}

impl ChordQuality {
    /// Semitone offsets of the three chord tones above the root.
    pub fn intervals(self) -> [u8; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
            ChordQuality::Diminished => [0, 3, 6],
        }
    }
}

/// A triad: three notes in slot order, lowest-intended voice first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chord {
    notes: [Note; 3],
    quality: ChordQuality,
    duration: u32,
    is_inverted: bool,
}

impl Chord {
    /// Build a root-position triad on `root`. Every chord tone takes the
    /// root's duration and sounds immediately (zero start delay).
    pub fn new(root: Note, quality: ChordQuality) -> Result<Self, HarmonyError> {
        let duration = root.duration();
        let [a, b, c] = quality.intervals();
        let tone = |interval: u8| Note::new(root.value() + interval, 0, duration);
        Ok(Chord {
            notes: [tone(a)?, tone(b)?, tone(c)?],
            quality,
            duration,
            is_inverted: false,
        })
    }

    /// The chord tones in slot order.
    pub fn notes(&self) -> &[Note; 3] {
        &self.notes
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    /// Common duration of all three tones, in ticks.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Whether this voicing came out of an inversion.
    pub fn is_inverted(&self) -> bool {
        self.is_inverted
    }

    /// Highest MIDI value among the chord tones.
    pub fn max_value(&self) -> u8 {
        self.notes[0]
            .value()
            .max(self.notes[1].value())
            .max(self.notes[2].value())
    }

    /// Pitch classes in slot order.
    pub fn pitch_classes(&self) -> [u8; 3] {
        [
            self.notes[0].pitch_class(),
            self.notes[1].pitch_class(),
            self.notes[2].pitch_class(),
        ]
    }

    /// First inversion: the lowest tone moves to the top an octave up.
    /// Diminished triads are not invertible.
    pub fn first_inversion(&self) -> Result<Self, HarmonyError> {
        if self.quality == ChordQuality::Diminished {
            return Err(HarmonyError::NotInvertible(self.quality));
        }
        let lifted = self.notes[0].change_octave(1)?;
        Ok(Chord {
            notes: [self.notes[1], self.notes[2], lifted],
            quality: self.quality,
            duration: self.duration,
            is_inverted: true,
        })
    }

    /// Second inversion: invert twice, then bring every tone down an
    /// octave, so the original middle tone ends up lowest.
    pub fn second_inversion(&self) -> Result<Self, HarmonyError> {
        let twice = self.first_inversion()?.first_inversion()?;
        Ok(Chord {
            notes: [
                twice.notes[0].change_octave(-1)?,
                twice.notes[1].change_octave(-1)?,
                twice.notes[2].change_octave(-1)?,
            ],
            ..twice
        })
    }
}

/// Slot-wise pitch-class equality. Slot order is kept canonical through
/// inversion, so two voicings compare equal only when the same pitch
/// classes occupy the same slots.
impl PartialEq for Chord {
    fn eq(&self, other: &Self) -> bool {
        self.notes == other.notes
    }
}

impl Eq for Chord {}

#[cfg(test)]
mod tests {
    use super::*;

    fn major_at(value: u8) -> Chord {
        Chord::new(Note::new(value, 0, 384).unwrap(), ChordQuality::Major).unwrap()
    }

    fn sorted_pitch_classes(chord: &Chord) -> [u8; 3] {
        let mut pcs = chord.pitch_classes();
        pcs.sort_unstable();
        pcs
    }

    #[test]
    fn test_construction_stacks_intervals() {
        let chord = Chord::new(
            Note::new(60, 50, 384).unwrap(),
            ChordQuality::Minor,
        )
        .unwrap();

        let values: Vec<u8> = chord.notes().iter().map(Note::value).collect();
        assert_eq!(values, vec![60, 63, 67]);
        for note in chord.notes() {
            assert_eq!(note.start_delay(), 0);
            assert_eq!(note.duration(), 384);
        }
        assert!(!chord.is_inverted());
    }

    #[test]
    fn test_construction_rejects_out_of_range_tones() {
        let root = Note::new(125, 0, 384).unwrap();
        assert!(matches!(
            Chord::new(root, ChordQuality::Major),
            Err(HarmonyError::PitchOutOfRange(_))
        ));
    }

    #[test]
    fn test_first_inversion_preserves_pitch_class_set() {
        let chord = major_at(60);
        let inverted = chord.first_inversion().unwrap();

        assert_eq!(sorted_pitch_classes(&inverted), sorted_pitch_classes(&chord));
        assert!(inverted.is_inverted());

        let values: Vec<u8> = inverted.notes().iter().map(Note::value).collect();
        assert_eq!(values, vec![64, 67, 72]);
    }

    #[test]
    fn test_diminished_is_not_invertible() {
        let dim = Chord::new(Note::new(71, 0, 384).unwrap(), ChordQuality::Diminished).unwrap();
        assert_eq!(
            dim.first_inversion().unwrap_err(),
            HarmonyError::NotInvertible(ChordQuality::Diminished)
        );
    }

    #[test]
    fn test_double_second_inversion_keeps_harmonic_content() {
        let chord = major_at(60);
        let twice = chord
            .second_inversion()
            .unwrap()
            .second_inversion()
            .unwrap();
        assert_eq!(sorted_pitch_classes(&twice), [0, 4, 7]);
    }

    #[test]
    fn test_second_inversion_puts_middle_tone_lowest() {
        let second = major_at(60).second_inversion().unwrap();
        let values: Vec<u8> = second.notes().iter().map(Note::value).collect();
        assert_eq!(values, vec![55, 60, 64]);
        assert_eq!(second.notes()[0].pitch_class(), 7);
    }

    #[test]
    fn test_equality_ignores_register_but_not_slot_order() {
        assert_eq!(major_at(60), major_at(72));

        let root_position = major_at(60);
        let inverted = root_position.first_inversion().unwrap();
        assert_ne!(root_position, inverted);
    }
}
