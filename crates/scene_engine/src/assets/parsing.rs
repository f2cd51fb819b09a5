//! Numeric token parsing shared by both scene formats

use super::LoadError;

/// Values closer than this to an integer are snapped onto it
pub const INTEGER_SNAP_EPSILON: f32 = 1e-4;

/// Snap near-integer values produced by lossy text export
pub fn snap_to_integer(value: f32) -> f32 {
    let rounded = value.round();
    if (rounded - value).abs() < INTEGER_SNAP_EPSILON {
        rounded
    } else {
        value
    }
}

/// Parse one float token, snapping near-integers
pub fn parse_float(token: &str) -> Result<f32, LoadError> {
    token
        .parse::<f32>()
        .map(snap_to_integer)
        .map_err(|_| LoadError::Format(format!("invalid float value '{token}'")))
}

/// Parse every whitespace-separated float in `text`
pub fn parse_floats(text: &str) -> Result<Vec<f32>, LoadError> {
    text.split_whitespace().map(parse_float).collect()
}

/// Parse every whitespace-separated non-negative integer in `text`
pub fn parse_indices(text: &str) -> Result<Vec<usize>, LoadError> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|_| LoadError::Format(format!("invalid index value '{token}'")))
        })
        .collect()
}

/// Parse exactly `N` floats
pub fn parse_fixed<const N: usize>(text: &str) -> Result<[f32; N], LoadError> {
    let values = parse_floats(text)?;
    values.try_into().map_err(|values: Vec<f32>| {
        LoadError::Format(format!("expected {N} numbers, found {}", values.len()))
    })
}

/// Parse the first `N` floats, ignoring optional trailing components
///
/// OBJ attribute lines may carry extras such as `w` on `v` and `vt`.
pub fn parse_leading<const N: usize>(text: &str) -> Result<[f32; N], LoadError> {
    let mut values = [0.0; N];
    let mut tokens = text.split_whitespace();
    for (found, slot) in values.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| LoadError::Format(format!("expected at least {N} numbers, found {found}")))?;
        *slot = parse_float(token)?;
    }
    Ok(values)
}
