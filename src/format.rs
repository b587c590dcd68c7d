//! Rendering decoded paths.
use crate::model::Model;
use std::io::Write;

/// Default number of labels in a line.
pub const LINE_WIDTH: usize = 60;

/// Convert state indices into the labels of the model.
pub fn render_path(path: &[usize], model: &Model) -> String {
    path.iter().map(|&s| model.label(s)).collect()
}

/// Insert a newline after every `width` characters. No trailing newline.
/// `width == 0` means no wrapping.
pub fn wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut wrapped = String::with_capacity(text.len() + text.len() / width);
    for (i, c) in text.chars().enumerate() {
        if i % width == 0 && i != 0 {
            wrapped.push('\n');
        }
        wrapped.push(c);
    }
    wrapped
}

/// Join the rolls by spaces, `width` rolls in a line. `width == 0` means no wrapping.
pub fn render_rolls(rolls: &[u8], width: usize) -> String {
    let width = if width == 0 { rolls.len().max(1) } else { width };
    rolls
        .chunks(width)
        .map(|line| {
            line.iter()
                .map(|x| x.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the reference labels (if any) and the decoded labels.
pub fn write_report<W: Write>(
    wtr: &mut W,
    reference: Option<&[char]>,
    decoded: &str,
    width: usize,
) -> std::io::Result<()> {
    if let Some(reference) = reference {
        let reference: String = reference.iter().collect();
        writeln!(wtr, "State solution:\n{}\n", wrap(&reference, width))?;
    }
    writeln!(wtr, "Viterbi output:\n{}", wrap(decoded, width))
}

/// Fraction of the positions where the two labels agree.
/// Only the shorter length is compared. Return `None` if either is empty.
pub fn agreement(reference: &[char], decoded: &str) -> Option<f64> {
    let len = reference.len().min(decoded.chars().count());
    if len == 0 {
        return None;
    }
    let matches = reference
        .iter()
        .zip(decoded.chars())
        .filter(|(x, y)| *x == y)
        .count();
    Some(matches as f64 / len as f64)
}
