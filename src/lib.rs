//! Decoding the hidden states of a hidden Markov model by the Viterbi algorithm.
//! The default model is the occasionally dishonest casino, switching between a fair die and a loaded die.
//! ```
//! let model = dicehmm::Model::default();
//! let path = dicehmm::decode(&[1, 3, 6, 6, 6, 6, 6, 6, 6, 6], &model).unwrap();
//! assert_eq!(dicehmm::format::render_path(&path, &model), "FFLLLLLLLL");
//! ```
pub mod error;
pub mod format;
pub mod gen_seq;
pub mod io;
pub mod model;
pub mod viterbi;
pub use error::{DiceError, Result};
pub use model::{Model, ModelConfig, State};
pub use viterbi::{decode, decode_states, decode_with_score, Decoded};
