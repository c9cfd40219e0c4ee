//! Weighted random selection among production alternatives.

use crate::error::WeightError;
use rand::Rng;
use serde::{Deserialize, Serialize};

fn validate(weights: impl Iterator<Item = f64>) -> Result<f64, WeightError> {
    let mut total = 0.0;
    let mut seen = false;
    for (index, weight) in weights.enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(WeightError::InvalidWeight { index, weight });
        }
        total += weight;
        seen = true;
    }
    if !seen {
        return Err(WeightError::Empty);
    }
    if !total.is_finite() {
        return Err(WeightError::TotalOverflow);
    }
    if total <= 0.0 {
        return Err(WeightError::AllZero);
    }
    Ok(total)
}

/// Picks one of `alternatives` with probability proportional to its weight.
///
/// Draws `r` uniformly from `[0, total)` and returns the first alternative
/// whose cumulative weight exceeds `r`. Zero-weight alternatives are never
/// selected.
pub fn choose<'a, T, R: Rng + ?Sized>(
    alternatives: &'a [(T, f64)],
    rng: &mut R,
) -> Result<&'a T, WeightError> {
    let total = validate(alternatives.iter().map(|(_, w)| *w))?;
    let r = rng.gen_range(0.0..total);

    let mut cumulative = 0.0_f64;
    let mut last_positive = 0;
    for (index, (_, weight)) in alternatives.iter().enumerate() {
        if *weight > 0.0 {
            last_positive = index;
        }
        cumulative += *weight;
        if cumulative > r {
            return Ok(&alternatives[index].0);
        }
    }
    // Rounding can leave r == cumulative on the final step.
    Ok(&alternatives[last_positive].0)
}

/// A validated set of weighted alternatives with a precomputed prefix sum.
///
/// Selection is a linear scan over the cumulative weights and allocates nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedChoice<T> {
    values: Vec<T>,
    cumulative: Vec<f64>,
}

impl<T> WeightedChoice<T> {
    /// Validates the weights and builds the prefix sum.
    ///
    /// Fails when there are no alternatives, a weight is negative or not
    /// finite, all weights are zero, or the total is not finite.
    pub fn new(alternatives: impl IntoIterator<Item = (T, f64)>) -> Result<Self, WeightError> {
        let (values, weights): (Vec<T>, Vec<f64>) = alternatives.into_iter().unzip();
        validate(weights.iter().copied())?;

        let cumulative = weights
            .iter()
            .scan(0.0_f64, |acc, &w| {
                *acc += w;
                Some(*acc)
            })
            .collect();
        Ok(Self { values, cumulative })
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Returns `Some` with the single alternative when there is nothing to draw.
    pub fn only(&self) -> Option<&T> {
        match self.values.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    /// Draws one alternative with probability proportional to its weight.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let r = rng.gen_range(0.0..self.total_weight());
        let index = self
            .cumulative
            .iter()
            .position(|&c| c > r)
            .unwrap_or_else(|| self.last_positive());
        &self.values[index]
    }

    fn last_positive(&self) -> usize {
        let mut previous = 0.0_f64;
        let mut last = 0;
        for (index, &c) in self.cumulative.iter().enumerate() {
            if c > previous {
                last = index;
            }
            previous = c;
        }
        last
    }
}
