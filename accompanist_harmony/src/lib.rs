// Accompanist harmonization core.
//
// Harmonizes a monophonic melody by evolving a progression of triads, one
// per fixed-length bar, that is consonant with the melody and with its
// externally detected key. The pipeline: segment the melody into bars,
// derive the diatonic chord pool for the key, then run a generational
// search over whole progressions.
//
// Architecture:
// - note.rs: the Note value type (MIDI pitch + timing, pitch-class equality)
// - chord.rs: ChordQuality interval patterns + Chord triads with inversions
// - key.rs: major/minor scale tables and the diatonic chord pool
// - melody.rs: fixed-capacity bars and melody segmentation
// - progression.rs: the genome (random init, crossover, swap mutation)
// - scoring.rs: tunable fitness weights + chord/progression fitness
// - evolve.rs: elitist generational loop with a per-generation observer
// - error.rs: the error taxonomy (all failures are fail-fast)
//
// The search is deterministic given a seeded RNG: every stochastic
// operation draws from the caller's generator, never from ambient state.
// MIDI I/O lives in the accompanist_midi boundary crate; this crate never
// touches a file.

pub mod chord;
pub mod error;
pub mod evolve;
pub mod key;
pub mod melody;
pub mod note;
pub mod progression;
pub mod scoring;
