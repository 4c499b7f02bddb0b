//! GRU-style recurrent network for PM2.5 prediction.
//!
//! An untrained two-layer gated recurrent network used as a structured
//! noise generator: the weights are random and fixed at construction, and
//! the forecast loop layers diurnal, trend and spike corrections on top.
//!
//! ## Architecture
//!
//! - 11 input features per hourly observation (see [`features`])
//! - GRU layer 1: 64 units, scanned over the last 24 observations
//! - GRU layer 2: 32 units, one step on layer 1's final state
//! - Dense projection 32 → 1, scaled ×100 and clamped to [5, 250] µg/m³

pub mod features;
pub mod cell;
pub mod network;

pub use cell::{CellOutput, GateWeights, GruCell, WeightMatrix};
pub use features::{build_sequence, extract_features, FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use network::{GruNetwork, DEFAULT_HIDDEN_UNITS};
