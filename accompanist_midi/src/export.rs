// Progression export: chord-tone tracks appended to an SMF.
//
// One track per chord-tone slot, three for triads, so the harmonization
// plays alongside whatever tracks the file already has. Each bar's chord
// renders as a note-on/note-off pair per slot with a synthesized velocity;
// chord durations already equal the bar length, so deltas line up without
// any extra bookkeeping.

use accompanist_harmony::progression::Progression;
use midly::num::{u4, u7, u28};
use midly::{MetaMessage, MidiMessage, Smf, Track, TrackEvent, TrackEventKind};
use std::path::Path;

use crate::MidiError;

/// Velocity for synthesized chord tones when none is configured.
pub const DEFAULT_VELOCITY: u8 = 30;

/// Track names for the three chord-tone slots, lowest slot first.
const SLOT_NAMES: [&str; 3] = ["chord_root", "chord_third", "chord_fifth"];

/// Append one track per chord-tone slot to the file.
pub fn append_progression(smf: &mut Smf, progression: &Progression, velocity: u8) {
    for (slot, name) in SLOT_NAMES.iter().enumerate() {
        let mut track: Track = Vec::new();
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
        });
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::ProgramChange {
                    program: u7::new(0),
                },
            },
        });

        for chord in progression.chords() {
            let tone = &chord.notes()[slot];
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel: u4::new(0),
                    message: MidiMessage::NoteOn {
                        key: u7::new(tone.value()),
                        vel: u7::new(velocity),
                    },
                },
            });
            track.push(TrackEvent {
                delta: u28::new(tone.duration()),
                kind: TrackEventKind::Midi {
                    channel: u4::new(0),
                    message: MidiMessage::NoteOff {
                        key: u7::new(tone.value()),
                        vel: u7::new(0),
                    },
                },
            });
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }
}

/// Serialize the file to disk.
pub fn write_smf(smf: &Smf, path: &Path) -> Result<(), MidiError> {
    let mut buffer = Vec::new();
    smf.write_std(&mut buffer).map_err(|source| MidiError::Write {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, &buffer).map_err(|source| MidiError::Write {
        path: path.display().to_string(),
        source,
    })
}
