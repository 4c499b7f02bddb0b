//! Gated recurrent cell.
//!
//! One update step per call:
//!
//! ```text
//! For each unit i:
//!   z[i]     = sigmoid(W_update[i] · x)
//!   r[i]     = sigmoid(W_reset[i] · x)
//!   c[i]     = tanh(W_candidate[i] · x)
//!   h_new[i] = z[i] * h[i] + (1 - z[i]) * c[i]
//! ```
//!
//! The reset gate is evaluated and reported in [`CellOutput`] but does not
//! enter the hidden-state update.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-width of the uniform weight initialisation range.
pub const INIT_RANGE: f64 = 0.1;

/// Dense row-major matrix of shape (rows × cols).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl WeightMatrix {
    /// Uniform random values in `[-INIT_RANGE, INIT_RANGE)`.
    pub fn random(rows: usize, cols: usize, rng: &mut StdRng) -> Self {
        let data = (0..rows * cols)
            .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
            .collect();
        Self { rows, cols, data }
    }

    /// Build from explicit rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "WeightMatrix rows must all have length {cols}"
        );
        Self {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Number of scalar weights.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `row(i) · x`
    #[inline]
    fn dot_row(&self, i: usize, x: &[f64]) -> f64 {
        self.row(i).iter().zip(x).map(|(w, v)| w * v).sum()
    }
}

/// Update, reset and candidate matrices for one layer, each (units × input_dim).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateWeights {
    pub update: WeightMatrix,
    pub reset: WeightMatrix,
    pub candidate: WeightMatrix,
}

impl GateWeights {
    /// Random initialisation in update → reset → candidate order.
    pub fn random(units: usize, input_dim: usize, rng: &mut StdRng) -> Self {
        let update = WeightMatrix::random(units, input_dim, rng);
        let reset = WeightMatrix::random(units, input_dim, rng);
        let candidate = WeightMatrix::random(units, input_dim, rng);
        Self { update, reset, candidate }
    }

    pub fn new(update: WeightMatrix, reset: WeightMatrix, candidate: WeightMatrix) -> Self {
        assert!(
            update.rows() == reset.rows()
                && update.rows() == candidate.rows()
                && update.cols() == reset.cols()
                && update.cols() == candidate.cols(),
            "gate matrices must share one shape"
        );
        Self { update, reset, candidate }
    }

    pub fn units(&self) -> usize {
        self.update.rows()
    }

    pub fn input_dim(&self) -> usize {
        self.update.cols()
    }

    pub fn num_params(&self) -> usize {
        self.update.len() + self.reset.len() + self.candidate.len()
    }
}

/// Gate activations and new hidden state from one step.
#[derive(Debug, Clone, PartialEq)]
pub struct CellOutput {
    pub hidden: Vec<f64>,
    pub update_gate: Vec<f64>,
    pub reset_gate: Vec<f64>,
    pub candidate: Vec<f64>,
}

/// Gated recurrent cell: stateless, weights are passed in.
pub struct GruCell;

impl GruCell {
    /// Run one step and return the new hidden state.
    ///
    /// # Panics
    /// If `input` does not match the weights' input dimension or `hidden`
    /// does not match the unit count.
    pub fn forward(input: &[f64], hidden: &[f64], weights: &GateWeights) -> Vec<f64> {
        Self::forward_with_gates(input, hidden, weights).hidden
    }

    /// Run one step and keep every gate activation.
    pub fn forward_with_gates(input: &[f64], hidden: &[f64], weights: &GateWeights) -> CellOutput {
        assert_eq!(
            input.len(),
            weights.input_dim(),
            "GRU input length does not match weight columns"
        );
        assert_eq!(
            hidden.len(),
            weights.units(),
            "GRU hidden length does not match unit count"
        );

        let units = weights.units();
        let update_gate: Vec<f64> = (0..units)
            .map(|i| sigmoid(weights.update.dot_row(i, input)))
            .collect();
        let reset_gate: Vec<f64> = (0..units)
            .map(|i| sigmoid(weights.reset.dot_row(i, input)))
            .collect();
        let candidate: Vec<f64> = (0..units)
            .map(|i| weights.candidate.dot_row(i, input).tanh())
            .collect();

        let hidden = (0..units)
            .map(|i| update_gate[i] * hidden[i] + (1.0 - update_gate[i]) * candidate[i])
            .collect();

        CellOutput { hidden, update_gate, reset_gate, candidate }
    }
}

// ============================================================================
// Activation functions
// ============================================================================

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fixed_weights() -> GateWeights {
        GateWeights::new(
            WeightMatrix::zeros(2, 2),
            WeightMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            WeightMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, -1.0]]),
        )
    }

    #[test]
    fn test_hand_computed_step() {
        let weights = fixed_weights();
        let out = GruCell::forward(&[1.0, 0.0], &[0.5, -0.5], &weights);

        // z = sigmoid(0) = 0.5 for both units; c = [tanh(1), tanh(0)]
        let expected = [0.5 * 0.5 + 0.5 * 1.0_f64.tanh(), 0.5 * -0.5];
        assert!((out[0] - expected[0]).abs() < 1e-12);
        assert!((out[1] - expected[1]).abs() < 1e-12);
    }

    #[test]
    fn test_cell_is_pure() {
        let weights = fixed_weights();
        let a = GruCell::forward(&[0.3, -0.7], &[0.1, 0.2], &weights);
        let b = GruCell::forward(&[0.3, -0.7], &[0.1, 0.2], &weights);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reset_gate_does_not_affect_hidden() {
        let mut other = fixed_weights();
        other.reset = WeightMatrix::from_rows(vec![vec![-5.0, 3.0], vec![2.0, 2.0]]);

        let a = GruCell::forward_with_gates(&[1.0, 0.0], &[0.5, -0.5], &fixed_weights());
        let b = GruCell::forward_with_gates(&[1.0, 0.0], &[0.5, -0.5], &other);

        assert_ne!(a.reset_gate, b.reset_gate);
        assert_eq!(a.hidden, b.hidden);
    }

    #[test]
    fn test_random_init_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = WeightMatrix::random(64, 11, &mut rng);
        assert_eq!(m.len(), 64 * 11);
        for i in 0..m.rows() {
            for &w in m.row(i) {
                assert!((-INIT_RANGE..INIT_RANGE).contains(&w), "weight {w} out of range");
            }
        }
    }

    #[test]
    #[should_panic(expected = "input length")]
    fn test_dimension_mismatch_fails_fast() {
        GruCell::forward(&[1.0, 2.0, 3.0], &[0.0, 0.0], &fixed_weights());
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-10);
        assert!(sigmoid(100.0) > 0.999);
        assert!(sigmoid(-100.0) < 0.001);
    }
}
