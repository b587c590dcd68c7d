//! Viterbi decoding in log-space.
//!
//! The engine is a pure function of a sequence and a [`Model`]: it does not log,
//! does not print, and does not keep any state between calls.
//! Sequences are one-based die faces, `1..=model.num_symbols()`.
//! An empty sequence decodes into an empty path.
use crate::error::{DiceError, Result};
use crate::model::{Model, State};

/// A decoded path with its joint log-likelihood, log(Pr{path, sequence}).
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub path: Vec<usize>,
    pub log_prob: f64,
}

/// A dynamic programming table. It is a serialized 2-d array, `[state][position]`.
#[derive(Debug, Clone)]
struct DPTable<T> {
    mem: Vec<T>,
    column: usize,
}

impl<T: Copy> DPTable<T> {
    fn new(row: usize, column: usize, init: T) -> Result<Self> {
        let mem = filled(row.saturating_mul(column), init)?;
        Ok(Self { mem, column })
    }
    fn get(&self, state: usize, t: usize) -> T {
        self.mem[state * self.column + t]
    }
    fn get_mut(&mut self, state: usize, t: usize) -> &mut T {
        &mut self.mem[state * self.column + t]
    }
}

/// Return the index of the maximum and the maximum itself.
/// If two or more values are the maximum, the largest index wins.
/// Every comparison in this module goes through this function.
pub fn argmax<I: IntoIterator<Item = f64>>(xs: I) -> (usize, f64) {
    xs.into_iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(arg, max), (i, x)| {
            if max <= x {
                (i, x)
            } else {
                (arg, max)
            }
        })
}

// Allocate `cells` copies of `init`, failing with `ResourceExhausted` instead of aborting.
fn filled<T: Copy>(cells: usize, init: T) -> Result<Vec<T>> {
    let mut mem = Vec::new();
    mem.try_reserve_exact(cells)
        .map_err(|_| DiceError::ResourceExhausted { cells })?;
    mem.extend(std::iter::repeat(init).take(cells));
    Ok(mem)
}

// Check the symbols and convert them into zero-based indices.
fn to_symbols(sequence: &[u8], model: &Model) -> Result<Vec<usize>> {
    let num_symbols = model.num_symbols();
    let is_valid = |x: u8| (1..=num_symbols).contains(&(x as usize));
    let invalid = sequence.iter().enumerate().find(|&(_, &x)| !is_valid(x));
    if let Some((position, &symbol)) = invalid {
        return Err(DiceError::InvalidObservation {
            position,
            symbol,
            num_symbols,
        });
    }
    let mut obs = filled(sequence.len(), 0usize)?;
    obs.iter_mut()
        .zip(sequence.iter())
        .for_each(|(o, &x)| *o = x as usize - 1);
    Ok(obs)
}

/// Decode the most probable state path. Each element of the returned vector
/// is a state index of the model.
pub fn decode(sequence: &[u8], model: &Model) -> Result<Vec<usize>> {
    decode_with_score(sequence, model).map(|decoded| decoded.path)
}

/// Decode with the casino model, [`Model::default()`].
pub fn decode_states(sequence: &[u8]) -> Result<Vec<State>> {
    let path = decode(sequence, &Model::default())?;
    Ok(path.into_iter().filter_map(State::from_index).collect())
}

/// Decode the most probable state path, together with its log-likelihood.
/// If no path can emit the sequence, the log-likelihood is `-inf`
/// and the path is still well-defined by the tie-breaking rule of [`argmax`].
pub fn decode_with_score(sequence: &[u8], model: &Model) -> Result<Decoded> {
    let obs = to_symbols(sequence, model)?;
    let (states, len) = (model.num_states(), obs.len());
    if len == 0 {
        return Ok(Decoded {
            path: vec![],
            log_prob: 0f64,
        });
    }
    let mut log_prob = DPTable::new(states, len, f64::NEG_INFINITY)?;
    let mut backpointer = DPTable::new(states, len, 0usize)?;
    // Initialization. Note that these are logarithms.
    for s in 0..states {
        *log_prob.get_mut(s, 0) = model.initial_log_prob(s) + model.emission_log_prob(obs[0], s);
    }
    // Recursion.
    for (t, &x) in obs.iter().enumerate().skip(1) {
        for to in 0..states {
            let candidates = (0..states).map(|from| {
                log_prob.get(from, t - 1) + model.transition_log_prob(from, to)
            });
            let (from, max) = argmax(candidates);
            *log_prob.get_mut(to, t) = model.emission_log_prob(x, to) + max;
            *backpointer.get_mut(to, t) = from;
        }
    }
    // Traceback, up to the first position.
    let (last, lk) = argmax((0..states).map(|s| log_prob.get(s, len - 1)));
    let mut path = filled(len, last)?;
    for t in (0..len - 1).rev() {
        path[t] = backpointer.get(path[t + 1], t + 1);
    }
    Ok(Decoded { path, log_prob: lk })
}

/// Return the joint log-likelihood of `path` and `sequence`.
pub fn path_log_prob(sequence: &[u8], path: &[usize], model: &Model) -> Result<f64> {
    let obs = to_symbols(sequence, model)?;
    if obs.len() != path.len() {
        return Err(DiceError::LengthMismatch {
            sequence: obs.len(),
            path: path.len(),
        });
    }
    let num_states = model.num_states();
    let invalid = path.iter().enumerate().find(|&(_, &s)| num_states <= s);
    if let Some((position, &state)) = invalid {
        return Err(DiceError::InvalidState {
            position,
            state,
            num_states,
        });
    }
    let (first, first_obs) = match (path.first(), obs.first()) {
        (Some(&s), Some(&x)) => (s, x),
        _ => return Ok(0f64),
    };
    let init = model.initial_log_prob(first) + model.emission_log_prob(first_obs, first);
    let lk = path
        .windows(2)
        .zip(obs.iter().skip(1))
        .map(|(w, &x)| model.transition_log_prob(w[0], w[1]) + model.emission_log_prob(x, w[1]))
        .sum::<f64>();
    Ok(init + lk)
}
