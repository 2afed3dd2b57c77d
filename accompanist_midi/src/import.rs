// Melody import: Standard MIDI File -> note sequence.
//
// Tracks are flattened in file order and note-on/note-off events paired
// up: the delta on the note-on becomes the note's start delay, the delta
// on the note-off its sounding duration. A note-on with velocity zero is
// the running-status spelling of a note-off and is treated as one.
//
// Out-of-range pitches abort the import; nothing is clamped or skipped.

use crate::MidiError;
use accompanist_harmony::melody::Melody;
use accompanist_harmony::note::Note;
use midly::{MidiMessage, Smf, TrackEventKind};
use std::path::Path;

/// Extract the melody notes from a parsed SMF.
pub fn melody_notes(smf: &Smf) -> Result<Vec<Note>, MidiError> {
    let mut notes = Vec::new();
    let mut start_delay: u32 = 0;

    for track in &smf.tracks {
        for event in track {
            let TrackEventKind::Midi { message, .. } = event.kind else {
                continue;
            };
            match message {
                MidiMessage::NoteOn { vel, .. } if vel.as_int() > 0 => {
                    start_delay = event.delta.as_int();
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    notes.push(Note::new(key.as_int(), start_delay, event.delta.as_int())?);
                    start_delay = 0;
                }
                _ => {}
            }
        }
    }

    Ok(notes)
}

/// Read a .mid file and segment it into bars of `bar_ticks`.
pub fn read_melody(path: &Path, bar_ticks: u32) -> Result<Melody, MidiError> {
    let bytes = std::fs::read(path).map_err(|source| MidiError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let smf = Smf::parse(&bytes)?;
    let notes = melody_notes(&smf)?;
    Ok(Melody::with_bar_capacity(notes, bar_ticks)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u4, u7, u15, u28};
    use midly::{Format, Header, Timing, Track, TrackEvent};

    fn note_event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        }
    }

    fn on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        note_event(
            delta,
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        )
    }

    fn off(delta: u32, key: u8) -> TrackEvent<'static> {
        note_event(
            delta,
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        )
    }

    fn smf_with(track: Track<'static>) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(96)),
        ));
        smf.tracks.push(track);
        smf
    }

    #[test]
    fn test_pairs_on_and_off_events() {
        let smf = smf_with(vec![on(10, 60, 90), off(20, 60), on(0, 62, 90), off(384, 62)]);
        let notes = melody_notes(&smf).unwrap();

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].value(), 60);
        assert_eq!(notes[0].start_delay(), 10);
        assert_eq!(notes[0].duration(), 20);
        assert_eq!(notes[1].value(), 62);
        assert_eq!(notes[1].start_delay(), 0);
        assert_eq!(notes[1].duration(), 384);
    }

    #[test]
    fn test_zero_velocity_note_on_acts_as_note_off() {
        let smf = smf_with(vec![on(5, 64, 90), on(30, 64, 0)]);
        let notes = melody_notes(&smf).unwrap();

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].value(), 64);
        assert_eq!(notes[0].start_delay(), 5);
        assert_eq!(notes[0].duration(), 30);
    }

    #[test]
    fn test_non_note_events_are_ignored() {
        let mut track = vec![on(0, 60, 90)];
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
        });
        track.insert(0, note_event(0, MidiMessage::ProgramChange { program: u7::new(5) }));
        track.insert(2, off(384, 60));

        let notes = melody_notes(&smf_with(track)).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].duration(), 384);
    }
}
