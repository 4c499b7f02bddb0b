//! Two-layer GRU network: the structured-noise core of the predictor.
//!
//! Layer 1 scans the feature sequence step by step. Layer 2 runs exactly
//! once, taking layer 1's final hidden state as its single input. A dense
//! (1 × layer-2 units) projection produces the scalar, which is scaled back
//! to µg/m³ and clamped.
//!
//! Weights are drawn once from a seeded PRNG and never updated.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::gru::cell::{GateWeights, GruCell, WeightMatrix};
use crate::gru::features::{FeatureVector, NUM_FEATURES, PM25_SCALE};
use crate::types::clamp_pm25;

/// Default unit counts for (layer 1, layer 2).
pub const DEFAULT_HIDDEN_UNITS: [usize; 2] = [64, 32];

/// Immutable weights of the two-layer network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GruNetwork {
    layer1: GateWeights,
    layer2: GateWeights,
    /// Shape (1 × layer-2 units).
    dense: WeightMatrix,
}

impl GruNetwork {
    /// Create a network with deterministic initialization from `seed`.
    pub fn new(hidden_units: [usize; 2], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let [units1, units2] = hidden_units;

        let layer1 = GateWeights::random(units1, NUM_FEATURES, &mut rng);
        let layer2 = GateWeights::random(units2, units1, &mut rng);
        let dense = WeightMatrix::random(1, units2, &mut rng);

        Self { layer1, layer2, dense }
    }

    /// Assemble a network from explicit weights.
    ///
    /// # Panics
    /// If the layer shapes do not chain (11 → units1 → units2 → 1).
    pub fn from_weights(layer1: GateWeights, layer2: GateWeights, dense: WeightMatrix) -> Self {
        assert_eq!(layer1.input_dim(), NUM_FEATURES, "layer 1 must take {NUM_FEATURES} inputs");
        assert_eq!(layer2.input_dim(), layer1.units(), "layer 2 input must equal layer 1 units");
        assert_eq!(dense.rows(), 1, "dense projection must have one row");
        assert_eq!(dense.cols(), layer2.units(), "dense columns must equal layer 2 units");
        Self { layer1, layer2, dense }
    }

    pub fn hidden_units(&self) -> [usize; 2] {
        [self.layer1.units(), self.layer2.units()]
    }

    /// Total number of weights.
    pub fn num_params(&self) -> usize {
        self.layer1.num_params() + self.layer2.num_params() + self.dense.len()
    }

    /// Final hidden states of both layers. Fresh zero state on every call.
    pub fn hidden_states(&self, sequence: &[FeatureVector]) -> (Vec<f64>, Vec<f64>) {
        let mut hidden1 = vec![0.0; self.layer1.units()];
        let hidden2 = vec![0.0; self.layer2.units()];

        for step in sequence {
            hidden1 = GruCell::forward(step, &hidden1, &self.layer1);
        }
        let hidden2 = GruCell::forward(&hidden1, &hidden2, &self.layer2);

        (hidden1, hidden2)
    }

    /// Dense-layer output before scaling and clamping.
    pub fn forward_raw(&self, sequence: &[FeatureVector]) -> f64 {
        let (_, hidden2) = self.hidden_states(sequence);
        self.dense.row(0).iter().zip(&hidden2).map(|(w, h)| w * h).sum()
    }

    /// Predicted PM2.5 (µg/m³), clamped to the valid range.
    pub fn forward(&self, sequence: &[FeatureVector]) -> f64 {
        clamp_pm25(self.forward_raw(sequence) * PM25_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PM25_MAX, PM25_MIN};

    fn constant_sequence(len: usize, value: f64) -> Vec<FeatureVector> {
        vec![[value; NUM_FEATURES]; len]
    }

    #[test]
    fn test_param_count() {
        let net = GruNetwork::new(DEFAULT_HIDDEN_UNITS, 42);
        // 3*(64*11) + 3*(32*64) + 32
        assert_eq!(net.num_params(), 3 * 64 * 11 + 3 * 32 * 64 + 32);
        assert_eq!(net.hidden_units(), [64, 32]);
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = GruNetwork::new(DEFAULT_HIDDEN_UNITS, 42);
        let b = GruNetwork::new(DEFAULT_HIDDEN_UNITS, 42);
        let c = GruNetwork::new(DEFAULT_HIDDEN_UNITS, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_forward_is_bounded() {
        let net = GruNetwork::new(DEFAULT_HIDDEN_UNITS, 42);
        for len in [0, 1, 5, 24] {
            for value in [-3.0, 0.0, 0.25, 2.5, 10.0] {
                let out = net.forward(&constant_sequence(len, value));
                assert!((PM25_MIN..=PM25_MAX).contains(&out), "out of range: {out}");
            }
        }
    }

    #[test]
    fn test_empty_sequence_is_zero_state() {
        let net = GruNetwork::new(DEFAULT_HIDDEN_UNITS, 42);
        let (h1, h2) = net.hidden_states(&[]);
        assert!(h1.iter().all(|&v| v == 0.0));
        assert_eq!(h2.len(), 32);
        // Zero input → z = 0.5, c = 0 → layer 2 stays at zero too
        assert!(h2.iter().all(|&v| v == 0.0));
        assert_eq!(net.forward_raw(&[]), 0.0);
        assert_eq!(net.forward(&[]), PM25_MIN);
    }

    #[test]
    fn test_no_state_carried_between_calls() {
        let net = GruNetwork::new(DEFAULT_HIDDEN_UNITS, 9);
        let seq = constant_sequence(12, 0.4);
        assert_eq!(net.forward_raw(&seq), net.forward_raw(&seq));
    }

    #[test]
    fn test_from_weights_hand_built() {
        let layer1 = GateWeights::new(
            WeightMatrix::zeros(1, NUM_FEATURES),
            WeightMatrix::zeros(1, NUM_FEATURES),
            WeightMatrix::from_rows(vec![{
                let mut row = vec![0.0; NUM_FEATURES];
                row[0] = 1.0;
                row
            }]),
        );
        let layer2 = GateWeights::new(
            WeightMatrix::zeros(1, 1),
            WeightMatrix::zeros(1, 1),
            WeightMatrix::from_rows(vec![vec![1.0]]),
        );
        let dense = WeightMatrix::from_rows(vec![vec![1.0]]);
        let net = GruNetwork::from_weights(layer1, layer2, dense);

        let mut step = [0.0; NUM_FEATURES];
        step[0] = 0.5;
        // h1 = 0.5 * tanh(0.5); h2 = 0.5 * tanh(h1); out = h2
        let h1 = 0.5 * 0.5_f64.tanh();
        let h2 = 0.5 * h1.tanh();
        assert!((net.forward_raw(&[step]) - h2).abs() < 1e-12);
        assert!((net.forward(&[step]) - clamp_pm25(h2 * 100.0)).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "layer 2 input")]
    fn test_from_weights_rejects_mismatched_layers() {
        GruNetwork::from_weights(
            GateWeights::random(4, NUM_FEATURES, &mut StdRng::seed_from_u64(1)),
            GateWeights::random(2, 3, &mut StdRng::seed_from_u64(2)),
            WeightMatrix::zeros(1, 2),
        );
    }
}
