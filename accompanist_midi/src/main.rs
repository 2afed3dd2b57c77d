// Accompanist CLI — harmonize a melody file.
//
// Reads a monophonic .mid file, builds the diatonic chord pool for the
// externally detected key (supplied via --key/--mode; detection itself
// lives outside this project), runs the evolutionary search, and writes a
// copy of the file with three chord-tone tracks appended.
//
// Usage:
//   harmonize input.mid --key C --mode major
//     [--out output.mid] [--seed N] [--generations N] [--population N]
//     [--selection N] [--velocity N] [--bar-ticks N] [--config FILE.json]
//     [--weights FILE.json] [--no-inversions]
//
// --config loads a full EvolveConfig (including the crossover and mutation
// probabilities); the individual flags override whatever it sets.

use accompanist_harmony::evolve::{EvolveConfig, evolve};
use accompanist_harmony::key::{ChordPool, Mode};
use accompanist_harmony::melody::{DEFAULT_BAR_TICKS, Melody};
use accompanist_harmony::scoring::FitnessWeights;
use accompanist_midi::MidiError;
use accompanist_midi::export::{DEFAULT_VELOCITY, append_progression, write_smf};
use accompanist_midi::import::melody_notes;
use midly::Smf;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    let Some(input_path) = args.get(1).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: harmonize input.mid --key C --mode major [options]");
        std::process::exit(2);
    };
    let Some(literal) = parse_flag::<String>(&args, "--key") else {
        eprintln!("missing required --key flag (the externally detected tonic, e.g. --key F#)");
        std::process::exit(2);
    };
    let mode_name: String = parse_flag(&args, "--mode").unwrap_or_else(|| "major".to_string());
    let Some(mode) = Mode::from_name(&mode_name) else {
        eprintln!("unknown mode '{mode_name}' (expected major or minor)");
        std::process::exit(2);
    };

    let seed: Option<u64> = parse_flag(&args, "--seed");
    let bar_ticks: u32 = parse_flag(&args, "--bar-ticks").unwrap_or(DEFAULT_BAR_TICKS);
    // MIDI velocity is 7-bit.
    let velocity: u8 = parse_flag(&args, "--velocity")
        .unwrap_or(DEFAULT_VELOCITY)
        .min(127);
    let include_inversions = !args.iter().any(|arg| arg == "--no-inversions");

    let mut config = match parse_flag::<String>(&args, "--config") {
        Some(path) => match load_json::<EvolveConfig>(Path::new(&path)) {
            Ok(config) => {
                println!("Loaded search config from {path}");
                config
            }
            Err(error) => {
                eprintln!("failed to load search config from {path}: {error}");
                std::process::exit(1);
            }
        },
        None => EvolveConfig::default(),
    };
    if let Some(generations) = parse_flag(&args, "--generations") {
        config.generation_limit = generations;
    }
    if let Some(population) = parse_flag(&args, "--population") {
        config.population_size = population;
    }
    if let Some(selection) = parse_flag(&args, "--selection") {
        config.selection_factor = selection;
    }

    let weights = match parse_flag::<String>(&args, "--weights") {
        Some(path) => match load_json::<FitnessWeights>(Path::new(&path)) {
            Ok(weights) => {
                println!("Loaded fitness weights from {path}");
                weights
            }
            Err(error) => {
                eprintln!("failed to load weights from {path}: {error}");
                std::process::exit(1);
            }
        },
        None => FitnessWeights::default(),
    };

    println!("=== Accompanist Harmonizer ===");
    println!("Input: {input_path}");
    println!("Key: {literal} {mode_name}");
    if let Some(seed) = seed {
        println!("Seed: {seed}");
    }
    println!();

    println!("[1/4] Reading melody...");
    let bytes = match std::fs::read(input_path) {
        Ok(bytes) => bytes,
        Err(error) => {
            eprintln!("  failed to read {input_path}: {error}");
            std::process::exit(1);
        }
    };
    let mut smf = match Smf::parse(&bytes) {
        Ok(smf) => smf,
        Err(error) => {
            eprintln!("  malformed MIDI file {input_path}: {error}");
            std::process::exit(1);
        }
    };
    let melody = match melody_notes(&smf).and_then(|notes| {
        Melody::with_bar_capacity(notes, bar_ticks).map_err(MidiError::from)
    }) {
        Ok(melody) => melody,
        Err(error) => {
            eprintln!("  could not build melody: {error}");
            std::process::exit(1);
        }
    };
    println!(
        "  {} notes across {} bars of {} ticks.",
        melody.notes().len(),
        melody.bars().len(),
        bar_ticks
    );

    println!("[2/4] Building chord pool...");
    let pool = match ChordPool::new(&melody, &literal, mode, include_inversions) {
        Ok(pool) => pool,
        Err(error) => {
            eprintln!("  could not build chord pool: {error}");
            std::process::exit(1);
        }
    };
    println!("  {} candidate chords ({} perfect) in {}.",
        pool.chords().len(),
        pool.perfect_chords().len(),
        pool
    );

    println!(
        "[3/4] Evolving ({} generations, population {})...",
        config.generation_limit, config.population_size
    );
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let result = match evolve(&melody, &pool, &config, &weights, &mut rng, |event| {
        if event.generation % 100 == 0 {
            println!(
                "  generation {} of {}, best fitness {}",
                event.generation, config.generation_limit, event.best_fitness
            );
        }
    }) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("  search failed: {error}");
            std::process::exit(1);
        }
    };
    println!("  Best fitness: {}", result.best_fitness);

    let output_path: PathBuf = parse_flag::<PathBuf>(&args, "--out")
        .unwrap_or_else(|| default_output_path(Path::new(input_path), &pool.to_string()));

    println!("[4/4] Writing {}...", output_path.display());
    append_progression(&mut smf, &result.best, velocity);
    if let Err(error) = write_smf(&smf, &output_path) {
        eprintln!("  {error}");
        std::process::exit(1);
    }
    println!("  Done.");
}

/// Derive an output name from the input stem and the key label, e.g.
/// `tune.mid` in C minor becomes `tune-harmonized-Cm.mid`.
fn default_output_path(input: &Path, key_label: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}-harmonized-{key_label}.mid"))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        let args: Vec<String> = ["harmonize", "in.mid", "--seed", "42", "--key", "C"]
            .iter()
            .map(|arg| arg.to_string())
            .collect();

        assert_eq!(parse_flag::<u64>(&args, "--seed"), Some(42));
        assert_eq!(parse_flag::<String>(&args, "--key"), Some("C".to_string()));
        assert_eq!(parse_flag::<u64>(&args, "--population"), None);
    }

    #[test]
    fn test_default_output_path_carries_the_key_label() {
        let path = default_output_path(Path::new("songs/tune.mid"), "F#m");
        assert_eq!(path, Path::new("songs/tune-harmonized-F#m.mid"));
    }
}
