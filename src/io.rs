//! Very thin readers for the sequence file and the reference-label file.
//! Only support batch IO.
use crate::error::{DiceError, Result};
use log::debug;
use std::io::{BufReader, Read};
use std::path::Path;

fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut reader = std::fs::File::open(&path)
        .map(BufReader::new)
        .map_err(|e| DiceError::io(&path, e))?;
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|e| DiceError::io(&path, e))?;
    Ok(contents)
}

/// Read whitespace-separated rolls from a file.
pub fn read_sequence<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let sequence = parse_sequence(&read_to_string(&path)?)?;
    debug!("Read {} rolls from {}", sequence.len(), path.as_ref().display());
    Ok(sequence)
}

/// Parse whitespace-separated integers. The range is not checked here;
/// it depends on the model.
pub fn parse_sequence(contents: &str) -> Result<Vec<u8>> {
    contents
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<u8>().map_err(|e| {
                DiceError::Parse(format!("token {} ({:?}) is not a roll: {}", i + 1, token, e))
            })
        })
        .collect()
}

/// Read reference labels, one character per line.
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Vec<char>> {
    let labels = parse_labels(&read_to_string(&path)?)?;
    debug!("Read {} labels from {}", labels.len(), path.as_ref().display());
    Ok(labels)
}

/// Take the single non-whitespace character of each line. Blank lines are skipped.
/// A line with two or more characters is an error.
pub fn parse_labels(contents: &str) -> Result<Vec<char>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let mut chars = line.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(label), None) => Ok(label),
                _ => Err(DiceError::Parse(format!(
                    "line {} ({:?}) is not a single label",
                    i + 1,
                    line.trim()
                ))),
            }
        })
        .collect()
}
