// The harmonization engine: a fixed-budget generational search.
//
// Each generation ranks the population by fitness, keeps the top
// `selection_factor` individuals unchanged (elitism), and refills to
// `population_size` with mutated crossover children of randomly drawn
// survivors. There is no convergence check: the generation budget is the
// only bound on run time.
//
// The population is exclusively owned by the running invocation, and all
// randomness flows through the caller's RNG, so a seeded run reproduces
// exactly. Progress surfaces through a per-generation observer callback
// rather than ad hoc printing, leaving presentation to the caller.

use crate::error::HarmonyError;
use crate::key::ChordPool;
use crate::melody::Melody;
use crate::progression::Progression;
use crate::scoring::FitnessWeights;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolveConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Survivors kept unchanged into the next generation.
    pub selection_factor: usize,
    /// Fixed number of generations to run.
    pub generation_limit: usize,
    /// Probability that crossover keeps the first parent's gene.
    pub crossover_keep_prob: f64,
    /// Probability that a child is mutated at all.
    pub mutation_invoke_prob: f64,
    /// Per-gene probability of being left alone once mutation runs.
    pub mutation_gene_prob: f64,
}

impl Default for EvolveConfig {
    fn default() -> Self {
        EvolveConfig {
            population_size: 100,
            selection_factor: 10,
            generation_limit: 2000,
            crossover_keep_prob: 0.2,
            mutation_invoke_prob: 0.1,
            mutation_gene_prob: 0.5,
        }
    }
}

impl EvolveConfig {
    /// Reject configurations the search cannot run with. Called before
    /// any generation is evaluated.
    pub fn validate(&self) -> Result<(), HarmonyError> {
        if self.selection_factor > self.population_size {
            return Err(HarmonyError::SelectionExceedsPopulation {
                selection_factor: self.selection_factor,
                population_size: self.population_size,
            });
        }
        if self.selection_factor < 2 {
            return Err(HarmonyError::SelectionTooSmall(self.selection_factor));
        }
        Ok(())
    }
}

/// Progress report delivered to the observer once per generation, before
/// the refill for that generation happens.
#[derive(Debug, Clone, Copy)]
pub struct GenerationEvent {
    pub generation: usize,
    pub best_fitness: i64,
}

/// Outcome of a finished search.
#[derive(Debug)]
pub struct EvolveResult {
    pub best: Progression,
    pub best_fitness: i64,
    pub generations: usize,
}

/// Run the evolutionary search and return the best progression found.
///
/// Pass an empty closure as `observer` to run silent.
pub fn evolve(
    melody: &Melody,
    pool: &ChordPool,
    config: &EvolveConfig,
    weights: &FitnessWeights,
    rng: &mut impl Rng,
    mut observer: impl FnMut(GenerationEvent),
) -> Result<EvolveResult, HarmonyError> {
    config.validate()?;

    log::debug!(
        "evolving {} bars: population {}, survivors {}, {} generations",
        melody.bars().len(),
        config.population_size,
        config.selection_factor,
        config.generation_limit
    );

    let mut population: Vec<Progression> = (0..config.population_size)
        .map(|_| Progression::random(pool, melody, rng))
        .collect();

    for generation in 0..config.generation_limit {
        let mut ranked = rank(population, pool, melody, weights);
        observer(GenerationEvent {
            generation,
            best_fitness: ranked[0].0,
        });

        ranked.truncate(config.selection_factor);
        let mut survivors: Vec<Progression> =
            ranked.into_iter().map(|(_, individual)| individual).collect();

        // Parents are drawn from the growing survivor list, so later
        // children can inherit from earlier ones within a generation.
        while survivors.len() < config.population_size {
            let (first, second) = distinct_pair(survivors.len(), rng);
            let child = Progression::crossover(
                &survivors[first],
                &survivors[second],
                config.crossover_keep_prob,
                rng,
            )
            .mutate(config.mutation_invoke_prob, config.mutation_gene_prob, rng);
            survivors.push(child);
        }

        population = survivors;
    }

    let mut ranked = rank(population, pool, melody, weights);
    let (best_fitness, best) = ranked.swap_remove(0);
    log::debug!("search finished: best fitness {best_fitness}");

    Ok(EvolveResult {
        best,
        best_fitness,
        generations: config.generation_limit,
    })
}

/// Score a population and sort it best-first. The sort is stable, so
/// equal-fitness individuals keep their relative order and runs stay
/// reproducible.
fn rank(
    population: Vec<Progression>,
    pool: &ChordPool,
    melody: &Melody,
    weights: &FitnessWeights,
) -> Vec<(i64, Progression)> {
    let mut ranked: Vec<(i64, Progression)> = population
        .into_iter()
        .map(|individual| (individual.fitness(pool, melody, weights), individual))
        .collect();
    ranked.sort_by_key(|(fitness, _)| Reverse(*fitness));
    ranked
}

/// Two distinct indices in `0..len`, uniformly. `len` must be at least 2,
/// which config validation guarantees.
fn distinct_pair(len: usize, rng: &mut impl Rng) -> (usize, usize) {
    let first = rng.random_range(0..len);
    let mut second = rng.random_range(0..len - 1);
    if second >= first {
        second += 1;
    }
    (first, second)
}
