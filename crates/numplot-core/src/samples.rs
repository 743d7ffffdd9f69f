//! Parsing of the comma-separated sample list submitted by the form.

use serde::Serialize;

use crate::error::{NumError, NumResult};

/// Non-empty sequence of finite y-values. The x-coordinate of each value is
/// its index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Samples {
    ys: Vec<f64>,
}

impl Samples {
    pub fn new(ys: Vec<f64>) -> NumResult<Self> {
        if ys.is_empty() {
            return Err(NumError::TooFewSamples {
                op: "samples",
                required: 1,
                got: 0,
            });
        }
        if let Some(bad) = ys.iter().find(|v| !v.is_finite()) {
            return Err(NumError::NonFinite(bad.to_string()));
        }
        Ok(Self { ys })
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Index positions `0, 1, ..., n-1` as floats.
    pub fn xs(&self) -> Vec<f64> {
        (0..self.ys.len()).map(|i| i as f64).collect()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.ys
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ys.len()
    }

    /// Never true for values built through `new` or `parse_samples`.
    pub fn is_empty(&self) -> bool {
        self.ys.is_empty()
    }
}

/// Parse `"1, 2.5,3"` into samples. Every token is trimmed and must parse as a
/// finite float; empty tokens are errors.
pub fn parse_samples(input: &str) -> NumResult<Samples> {
    let mut ys = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        let value: f64 = token
            .parse()
            .map_err(|_| NumError::InvalidNumber(token.to_string()))?;
        if !value.is_finite() {
            return Err(NumError::NonFinite(token.to_string()));
        }
        ys.push(value);
    }
    Samples::new(ys)
}
