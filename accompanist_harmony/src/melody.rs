// Melody segmentation into fixed-capacity bars.
//
// A bar is one harmonizable unit: a fixed number of ticks plus the notes
// that sound inside them. Melody construction packs each note's leading
// silence, then its sounding length, into successive bars; anything that
// straddles a boundary is split, re-emitting a zero-delay sub-note of the
// same pitch for the part that spills over. A melody that ends mid-bar
// drops the dangling partial bar: only complete bars are harmonized.
//
// Bars are append-only during construction and read-only afterwards. The
// accumulated length can never exceed the capacity; an append that would
// overflow is a hard error, not a truncation.

use crate::error::HarmonyError;
use crate::note::Note;
use serde::{Deserialize, Serialize};

/// Default bar capacity in ticks: one bar at the reference resolution.
pub const DEFAULT_BAR_TICKS: u32 = 384;

/// One fixed-capacity slice of the melody.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    capacity: u32,
    notes: Vec<Note>,
    length: u32,
}

impl Bar {
    pub fn new(capacity: u32) -> Self {
        Bar {
            capacity,
            notes: Vec::new(),
            length: 0,
        }
    }

    /// Notes sounding in this bar, in time order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Ticks accounted for so far (silence and sound).
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Unused ticks remaining.
    pub fn remaining(&self) -> u32 {
        self.capacity - self.length
    }

    /// Account for silence. Fails if it would overflow the bar.
    pub fn push_delay(&mut self, ticks: u32) -> Result<(), HarmonyError> {
        self.check(ticks)?;
        self.length += ticks;
        Ok(())
    }

    /// Append a sounding note. Its full span (delay plus duration) counts
    /// against the capacity.
    pub fn push_note(&mut self, note: Note) -> Result<(), HarmonyError> {
        self.check(note.span())?;
        self.length += note.span();
        self.notes.push(note);
        Ok(())
    }

    fn check(&self, added: u32) -> Result<(), HarmonyError> {
        if self.length + added > self.capacity {
            return Err(HarmonyError::BarOverflow {
                length: self.length,
                added,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// The input note sequence plus its derived bar segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Melody {
    notes: Vec<Note>,
    bars: Vec<Bar>,
    bar_capacity: u32,
}

impl Melody {
    /// Segment a note sequence with the default bar capacity.
    pub fn new(notes: Vec<Note>) -> Result<Self, HarmonyError> {
        Melody::with_bar_capacity(notes, DEFAULT_BAR_TICKS)
    }

    /// Segment a note sequence into bars of `bar_capacity` ticks.
    ///
    /// The bar count is the total tick span divided by the capacity, so a
    /// trailing partial bar is discarded rather than scored.
    pub fn with_bar_capacity(notes: Vec<Note>, bar_capacity: u32) -> Result<Self, HarmonyError> {
        assert!(bar_capacity > 0, "bar capacity must be positive");

        let total: u32 = notes.iter().map(Note::span).sum();
        let num_bars = (total / bar_capacity) as usize;
        let mut bars: Vec<Bar> = (0..num_bars).map(|_| Bar::new(bar_capacity)).collect();

        let mut bar_index = 0;
        'notes: for note in &notes {
            let mut delay = note.start_delay();
            while delay > 0 {
                if bar_index == bars.len() {
                    break 'notes;
                }
                let remaining = bars[bar_index].remaining();
                if remaining == 0 {
                    bar_index += 1;
                    continue;
                }
                let chunk = remaining.min(delay);
                bars[bar_index].push_delay(chunk)?;
                delay -= chunk;
            }

            let mut duration = note.duration();
            while duration > 0 {
                if bar_index == bars.len() {
                    break 'notes;
                }
                let remaining = bars[bar_index].remaining();
                if remaining == 0 {
                    bar_index += 1;
                    continue;
                }
                let chunk = remaining.min(duration);
                bars[bar_index].push_note(Note::new(note.value(), 0, chunk)?)?;
                duration -= chunk;
            }
        }

        Ok(Melody {
            notes,
            bars,
            bar_capacity,
        })
    }

    /// The raw input notes, untouched by segmentation.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// The complete bars derived from the input.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar_capacity(&self) -> u32 {
        self.bar_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(value: u8, start_delay: u32, duration: u32) -> Note {
        Note::new(value, start_delay, duration).unwrap()
    }

    #[test]
    fn test_whole_bar_notes_pack_one_per_bar() {
        let melody = Melody::new(vec![note(60, 0, 384), note(62, 0, 384)]).unwrap();

        assert_eq!(melody.bars().len(), 2);
        assert_eq!(melody.bars()[0].notes().len(), 1);
        assert_eq!(melody.bars()[0].notes()[0].value(), 60);
        assert_eq!(melody.bars()[1].notes()[0].value(), 62);
    }

    #[test]
    fn test_straddling_note_splits_into_zero_delay_sub_notes() {
        let melody = Melody::new(vec![note(60, 0, 500), note(62, 0, 268)]).unwrap();

        assert_eq!(melody.bars().len(), 2);

        let first = melody.bars()[0].notes();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].duration(), 384);

        let second = melody.bars()[1].notes();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].value(), 60);
        assert_eq!(second[0].start_delay(), 0);
        assert_eq!(second[0].duration(), 116);
        assert_eq!(second[1].value(), 62);
        assert_eq!(second[1].duration(), 268);
    }

    #[test]
    fn test_delay_splits_across_bars() {
        let melody = Melody::new(vec![note(60, 400, 368)]).unwrap();

        assert_eq!(melody.bars().len(), 2);
        assert!(melody.bars()[0].notes().is_empty());
        assert_eq!(melody.bars()[0].length(), 384);

        let second = melody.bars()[1].notes();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].start_delay(), 0);
        assert_eq!(second[0].duration(), 368);
    }

    #[test]
    fn test_trailing_partial_bar_is_discarded() {
        let melody = Melody::new(vec![note(60, 0, 500)]).unwrap();

        assert_eq!(melody.bars().len(), 1);
        assert_eq!(melody.bars()[0].length(), 384);
    }

    #[test]
    fn test_no_bar_exceeds_capacity() {
        let notes = vec![
            note(60, 17, 123),
            note(64, 0, 401),
            note(67, 250, 96),
            note(72, 3, 777),
        ];
        let melody = Melody::with_bar_capacity(notes, 256).unwrap();

        assert!(!melody.bars().is_empty());
        for bar in melody.bars() {
            assert!(bar.length() <= bar.capacity());
        }
    }

    #[test]
    fn test_bar_overflow_is_an_error() {
        let mut bar = Bar::new(10);
        assert_eq!(
            bar.push_note(note(60, 5, 6)),
            Err(HarmonyError::BarOverflow {
                length: 0,
                added: 11,
                capacity: 10,
            })
        );
        assert!(bar.push_note(note(60, 0, 10)).is_ok());
        assert_eq!(bar.remaining(), 0);
    }

    #[test]
    fn test_empty_melody_has_no_bars() {
        let melody = Melody::new(Vec::new()).unwrap();
        assert!(melody.bars().is_empty());
        assert!(melody.notes().is_empty());
    }
}
