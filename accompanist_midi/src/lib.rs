// Standard MIDI File boundary for the Accompanist harmonizer.
//
// The harmonization core knows nothing about files or MIDI events; this
// crate is the collaborator on either side of it:
// - import.rs: SMF note events -> the core's Note sequence
// - export.rs: a finished Progression -> chord-tone tracks in the SMF
//
// The `harmonize` binary (src/main.rs) wires the two around the engine.
// Key analysis stays external even here: the detected tonic and mode come
// in as command-line flags, never from the audio or event data.

use accompanist_harmony::error::HarmonyError;
use thiserror::Error;

pub mod export;
pub mod import;

/// Errors at the MIDI boundary.
#[derive(Debug, Error)]
pub enum MidiError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed MIDI file")]
    Parse(#[from] midly::Error),

    #[error(transparent)]
    Harmony(#[from] HarmonyError),
}
