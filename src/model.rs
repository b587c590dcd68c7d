//! Parameters of a discrete hidden Markov model.
use crate::error::{DiceError, Result};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Tolerance for a probability distribution to be regarded as summing up to one.
pub const SUM_TOLERANCE: f64 = 0.000001;
/// Number of faces of a die.
pub const NUM_FACES: usize = 6;

/// A hidden Markov model with discrete emissions.
/// All the probabilities are kept in log-space, so `log 0 = -inf` is a valid entry,
/// meaning "never".
/// Symbols are zero-based here: `emission_log_prob(0, state)` is the probability of face 1.
/// The model can not be modified after construction. Every constructor
/// validates the tables, so a `Model` at hand is always normalized.
/// The default value is the occasionally dishonest casino:
/// a fair die and a loaded die which shows 6 half of the time.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    num_states: usize,
    num_symbols: usize,
    /// log(Pr{state at position 0})
    log_initial: Vec<f64>,
    /// num_states * from + to = log(Pr{to|from})
    log_transition: Vec<f64>,
    /// num_symbols * state + symbol = log(Pr{symbol|state})
    log_emission: Vec<f64>,
    labels: Vec<char>,
}

/// Hidden states of the casino model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Fair,
    Loaded,
}

impl State {
    pub fn as_char(&self) -> char {
        match self {
            State::Fair => 'F',
            State::Loaded => 'L',
        }
    }
    /// Convert a state index of the casino model into a `State`.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(State::Fair),
            1 => Some(State::Loaded),
            _ => None,
        }
    }
}

impl std::convert::From<State> for usize {
    fn from(state: State) -> usize {
        match state {
            State::Fair => 0,
            State::Loaded => 1,
        }
    }
}

/// Serialized form of a [`Model`]. Probabilities are in the usual, linear space.
/// `emission` has one row for each state, a distribution over the symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub labels: Vec<char>,
    pub initial: Vec<f64>,
    pub transition: Vec<Vec<f64>>,
    pub emission: Vec<Vec<f64>>,
}

impl std::default::Default for Model {
    fn default() -> Self {
        let fair = vec![1f64 / 6f64; NUM_FACES];
        let loaded = vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.5];
        let transition = vec![vec![0.95, 0.05], vec![0.10, 0.90]];
        Self::from_parts(vec![1f64, 0f64], transition, vec![fair, loaded], vec!['F', 'L'])
    }
}

fn check_distribution(name: &str, probs: &[f64]) -> Result<()> {
    if let Some(p) = probs.iter().find(|p| !p.is_finite() || p.is_sign_negative()) {
        let msg = format!("{} contains a non-probability value {}", name, p);
        return Err(DiceError::invalid_model(msg));
    }
    let sum: f64 = probs.iter().sum();
    if SUM_TOLERANCE < (sum - 1f64).abs() {
        let msg = format!("{} sums up to {}, not 1", name, sum);
        return Err(DiceError::invalid_model(msg));
    }
    Ok(())
}

impl Model {
    /// Create a new model from probabilities (not logarithms).
    /// `transition[i][j]` is Pr{j|i}, and `emission[s][x]` is Pr{face x+1|s}.
    /// Return `InvalidModel` if the tables do not agree on dimensions or
    /// some row is not a probability distribution.
    pub fn new(
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
        labels: Vec<char>,
    ) -> Result<Self> {
        let num_states = initial.len();
        if num_states == 0 {
            return Err(DiceError::invalid_model("the model has no state"));
        }
        if transition.len() != num_states || emission.len() != num_states {
            let msg = format!(
                "{} initial probabilities, {} transition rows, and {} emission rows",
                num_states,
                transition.len(),
                emission.len()
            );
            return Err(DiceError::invalid_model(msg));
        }
        if labels.len() != num_states {
            let msg = format!("{} labels for {} states", labels.len(), num_states);
            return Err(DiceError::invalid_model(msg));
        }
        for (i, c) in labels.iter().enumerate() {
            if labels[..i].contains(c) {
                let msg = format!("label {} is used twice", c);
                return Err(DiceError::invalid_model(msg));
            }
        }
        let num_symbols = emission[0].len();
        if num_symbols == 0 {
            return Err(DiceError::invalid_model("the model has no symbol"));
        }
        if (u8::MAX as usize) < num_symbols {
            let msg = format!("{} symbols do not fit in a byte", num_symbols);
            return Err(DiceError::invalid_model(msg));
        }
        check_distribution("initial distribution", &initial)?;
        for (i, row) in transition.iter().enumerate() {
            if row.len() != num_states {
                let msg = format!("transition row {} has {} columns", i, row.len());
                return Err(DiceError::invalid_model(msg));
            }
            check_distribution(&format!("transition row {}", i), row)?;
        }
        for (i, row) in emission.iter().enumerate() {
            if row.len() != num_symbols {
                let msg = format!("emission row {} has {} symbols", i, row.len());
                return Err(DiceError::invalid_model(msg));
            }
            check_distribution(&format!("emission row {}", i), row)?;
        }
        Ok(Self::from_parts(initial, transition, emission, labels))
    }
    // Tables should be validated beforehand.
    fn from_parts(
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
        labels: Vec<char>,
    ) -> Self {
        Self {
            num_states: initial.len(),
            num_symbols: emission[0].len(),
            log_initial: initial.iter().map(|x| x.ln()).collect(),
            log_transition: transition.iter().flatten().map(|x| x.ln()).collect(),
            log_emission: emission.iter().flatten().map(|x| x.ln()).collect(),
            labels,
        }
    }
    /// The same model, starting from another initial distribution.
    pub fn with_initial(&self, initial: Vec<f64>) -> Result<Self> {
        let config = ModelConfig {
            initial,
            ..self.to_config()
        };
        Self::try_from(config)
    }
    /// Read a model from a JSON file. See [`ModelConfig`] for the format.
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(&path).map_err(|e| DiceError::io(&path, e))?;
        let config: ModelConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        Self::try_from(config)
    }
    /// Back to the linear-space parameters.
    pub fn to_config(&self) -> ModelConfig {
        let exp = |xs: &[f64]| -> Vec<f64> { xs.iter().map(|x| x.exp()).collect() };
        ModelConfig {
            labels: self.labels.clone(),
            initial: exp(&self.log_initial),
            transition: self.log_transition.chunks_exact(self.num_states).map(exp).collect(),
            emission: self.log_emission.chunks_exact(self.num_symbols).map(exp).collect(),
        }
    }
    pub fn num_states(&self) -> usize {
        self.num_states
    }
    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }
    /// log(Pr{to|from}).
    pub fn transition_log_prob(&self, from: usize, to: usize) -> f64 {
        self.log_transition[from * self.num_states + to]
    }
    /// log(Pr{symbol|state}), where symbol is zero-based.
    pub fn emission_log_prob(&self, symbol: usize, state: usize) -> f64 {
        self.log_emission[state * self.num_symbols + symbol]
    }
    /// log(Pr{state at the first position}).
    pub fn initial_log_prob(&self, state: usize) -> f64 {
        self.log_initial[state]
    }
    pub fn label(&self, state: usize) -> char {
        self.labels[state]
    }
    pub fn labels(&self) -> &[char] {
        &self.labels
    }
}

impl TryFrom<ModelConfig> for Model {
    type Error = DiceError;
    fn try_from(config: ModelConfig) -> Result<Self> {
        let ModelConfig {
            labels,
            initial,
            transition,
            emission,
        } = config;
        Self::new(initial, transition, emission, labels)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Init:")?;
        for x in self.log_initial.iter() {
            write!(f, "\t{:.3}", x.exp())?;
        }
        for (label, row) in self
            .labels
            .iter()
            .zip(self.log_transition.chunks_exact(self.num_states))
        {
            write!(f, "\n{}->:", label)?;
            for x in row {
                write!(f, "\t{:.3}", x.exp())?;
            }
        }
        for (label, row) in self
            .labels
            .iter()
            .zip(self.log_emission.chunks_exact(self.num_symbols))
        {
            write!(f, "\nObs({}):", label)?;
            for x in row {
                write!(f, "\t{:.3}", x.exp())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn casino() {
        let model = Model::default();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_symbols(), NUM_FACES);
        assert_eq!(model.labels(), &['F', 'L']);
        assert_eq!(model.initial_log_prob(0), 0f64);
        assert_eq!(model.initial_log_prob(1), f64::NEG_INFINITY);
        assert!((model.transition_log_prob(0, 1) - 0.05f64.ln()).abs() < 1e-12);
        assert!((model.transition_log_prob(1, 0) - 0.1f64.ln()).abs() < 1e-12);
        for face in 0..5 {
            assert!((model.emission_log_prob(face, 0) - (1f64 / 6f64).ln()).abs() < 1e-12);
            assert!((model.emission_log_prob(face, 1) - 0.1f64.ln()).abs() < 1e-12);
        }
        assert!((model.emission_log_prob(5, 1) - 0.5f64.ln()).abs() < 1e-12);
    }
    #[test]
    fn rows_are_normalized() {
        let model = Model::default();
        for from in 0..model.num_states() {
            let sum: f64 = (0..model.num_states())
                .map(|to| model.transition_log_prob(from, to).exp())
                .sum();
            assert!((sum - 1f64).abs() < 1e-9, "{}", sum);
            let sum: f64 = (0..model.num_symbols())
                .map(|x| model.emission_log_prob(x, from).exp())
                .sum();
            assert!((sum - 1f64).abs() < 1e-9, "{}", sum);
        }
    }
    #[test]
    fn reject_malformed() {
        let unif = vec![0.5, 0.5];
        let trans = vec![unif.clone(), unif.clone()];
        let emit = vec![unif.clone(), unif.clone()];
        let labels = vec!['A', 'B'];
        let ok = Model::new(unif.clone(), trans.clone(), emit.clone(), labels.clone());
        assert!(ok.is_ok());
        let bad_sum = vec![vec![0.5, 0.6], unif.clone()];
        let res = Model::new(unif.clone(), bad_sum, emit.clone(), labels.clone());
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let bad_emit = vec![unif.clone(), vec![0.2, 0.2]];
        let res = Model::new(unif.clone(), trans.clone(), bad_emit, labels.clone());
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let negative = vec![vec![1.5, -0.5], unif.clone()];
        let res = Model::new(unif.clone(), negative, emit.clone(), labels.clone());
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let res = Model::new(vec![1.0], trans.clone(), emit.clone(), labels.clone());
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let res = Model::new(unif.clone(), trans.clone(), emit.clone(), vec!['A']);
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let res = Model::new(unif.clone(), trans.clone(), emit.clone(), vec!['A', 'A']);
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let nan = vec![f64::NAN, 1.0];
        let res = Model::new(nan, trans.clone(), emit.clone(), labels.clone());
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let res = Model::new(vec![], vec![], vec![], vec![]);
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
        let ragged = vec![unif.clone(), vec![0.2, 0.3, 0.5]];
        let res = Model::new(unif, trans, ragged, labels);
        assert!(matches!(res, Err(DiceError::InvalidModel(_))));
    }
    #[test]
    fn config_roundtrip() {
        let model = Model::default();
        let json = serde_json::to_string(&model.to_config()).unwrap();
        let config: ModelConfig = serde_json::from_str(&json).unwrap();
        let restored = Model::try_from(config).unwrap();
        assert_eq!(restored.labels(), model.labels());
        for i in 0..2 {
            for j in 0..2 {
                let diff = restored.transition_log_prob(i, j) - model.transition_log_prob(i, j);
                assert!(diff.abs() < 1e-9);
            }
        }
        assert_eq!(restored.initial_log_prob(1), f64::NEG_INFINITY);
    }
    #[test]
    fn parse_config() {
        let json = r#"{
            "labels": ["H", "C"],
            "initial": [0.6, 0.4],
            "transition": [[0.7, 0.3], [0.4, 0.6]],
            "emission": [[0.1, 0.4, 0.5], [0.7, 0.2, 0.1]]
        }"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        let model = Model::try_from(config).unwrap();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_symbols(), 3);
        assert_eq!(model.label(1), 'C');
        assert!((model.emission_log_prob(2, 0) - 0.5f64.ln()).abs() < 1e-12);
    }
    #[test]
    fn with_initial() {
        let model = Model::default();
        let model = model.with_initial(vec![0.5, 0.5]).unwrap();
        assert!((model.initial_log_prob(1) - 0.5f64.ln()).abs() < 1e-12);
        assert!(model.with_initial(vec![0.5, 0.6]).is_err());
        assert!(model.with_initial(vec![1.0]).is_err());
    }
    #[test]
    fn display() {
        let model = Model::default();
        let displayed = format!("{}", model);
        assert!(displayed.starts_with("Init:\t1.000\t0.000"));
        assert!(displayed.contains("F->:\t0.950\t0.050"));
        assert!(displayed.contains("Obs(L):\t0.100\t0.100\t0.100\t0.100\t0.100\t0.500"));
    }
    #[test]
    fn state_index() {
        assert_eq!(State::from_index(0), Some(State::Fair));
        assert_eq!(State::from_index(1), Some(State::Loaded));
        assert_eq!(State::from_index(2), None);
        assert_eq!(usize::from(State::Loaded), 1);
        assert_eq!(State::Fair.as_char(), 'F');
    }
}
