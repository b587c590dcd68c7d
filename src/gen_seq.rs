//! This module is to generate some random rolls to assess the decoder.
//! Usually, it would not be used in the real-applications.
use crate::error::{DiceError, Result};
use crate::model::{Model, NUM_FACES};
use rand::seq::SliceRandom;
use rand::Rng;

/// Rolls of a fair die.
pub fn generate_rolls<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(1..=NUM_FACES as u8)).collect()
}

fn choose<R: Rng>(rng: &mut R, log_probs: impl Fn(usize) -> f64, size: usize) -> Result<usize> {
    let indices: Vec<_> = (0..size).collect();
    indices
        .choose_weighted(rng, |&i| log_probs(i).exp())
        .map(|&i| i)
        .map_err(|e| DiceError::invalid_model(format!("can not sample from the model: {}", e)))
}

/// Run the model for `len` steps. Return the hidden states and the (one-based) rolls.
pub fn sample<R: Rng>(model: &Model, rng: &mut R, len: usize) -> Result<(Vec<usize>, Vec<u8>)> {
    let (states, symbols) = (model.num_states(), model.num_symbols());
    let mut path: Vec<usize> = Vec::with_capacity(len);
    let mut rolls = Vec::with_capacity(len);
    for _ in 0..len {
        let state = match path.last() {
            Some(&prev) => choose(rng, |to| model.transition_log_prob(prev, to), states)?,
            None => choose(rng, |s| model.initial_log_prob(s), states)?,
        };
        let symbol = choose(rng, |x| model.emission_log_prob(x, state), symbols)?;
        path.push(state);
        // The number of symbols fits in a byte. See `Model::new`.
        rolls.push(symbol as u8 + 1);
    }
    Ok((path, rolls))
}
