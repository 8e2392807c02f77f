//! Fully connected layer.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// `y = W x + b` with `W` stored row-major as `[out_dim][in_dim]`
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    pub(crate) in_dim: usize,
    pub(crate) out_dim: usize,
    pub(crate) weights: Vec<f32>,
    pub(crate) bias: Vec<f32>,
}

/// Persisted form of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub in_dim: usize,
    pub out_dim: usize,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// Gradient buffers shaped like a `Dense`
#[derive(Debug, Clone)]
pub(crate) struct DenseGrads {
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

impl DenseGrads {
    pub fn zeros_like(layer: &Dense) -> Self {
        Self {
            weights: vec![0.0; layer.weights.len()],
            bias: vec![0.0; layer.bias.len()],
        }
    }

    pub fn add_assign(&mut self, other: &DenseGrads) {
        for (a, b) in self.weights.iter_mut().zip(&other.weights) {
            *a += b;
        }
        for (a, b) in self.bias.iter_mut().zip(&other.bias) {
            *a += b;
        }
    }
}

impl Dense {
    /// Uniform `U(-1/sqrt(in_dim), 1/sqrt(in_dim))` initialization
    pub fn init<R: Rng>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_dim as f32).sqrt();
        let weights = (0..in_dim * out_dim)
            .map(|_| rng.random_range(-bound..bound))
            .collect();
        let bias = (0..out_dim).map(|_| rng.random_range(-bound..bound)).collect();
        Self {
            in_dim,
            out_dim,
            weights,
            bias,
        }
    }

    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks_exact(self.in_dim)
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect()
    }

    /// Accumulate parameter gradients for one sample and return the
    /// gradient with respect to the input.
    pub(crate) fn backward(
        &self,
        input: &[f32],
        delta: &[f32],
        grads: &mut DenseGrads,
        want_input_grad: bool,
    ) -> Option<Vec<f32>> {
        let mut input_grad = want_input_grad.then(|| vec![0.0; self.in_dim]);

        for (o, d) in delta.iter().enumerate() {
            if *d == 0.0 {
                continue;
            }
            grads.bias[o] += d;
            let row = o * self.in_dim..(o + 1) * self.in_dim;
            for (g, x) in grads.weights[row.clone()].iter_mut().zip(input) {
                *g += d * x;
            }
            if let Some(ig) = input_grad.as_mut() {
                for (acc, w) in ig.iter_mut().zip(&self.weights[row]) {
                    *acc += d * w;
                }
            }
        }
        input_grad
    }

    pub fn to_weights(&self) -> LayerWeights {
        LayerWeights {
            in_dim: self.in_dim,
            out_dim: self.out_dim,
            weights: self
                .weights
                .chunks_exact(self.in_dim)
                .map(<[f32]>::to_vec)
                .collect(),
            bias: self.bias.clone(),
        }
    }

    /// Rebuild a layer, checking the declared shape
    pub fn from_weights(name: &str, layer: LayerWeights) -> Result<Self, String> {
        if layer.in_dim == 0 || layer.out_dim == 0 {
            return Err(format!("layer {name} has an empty dimension"));
        }
        if layer.weights.len() != layer.out_dim
            || layer.weights.iter().any(|row| row.len() != layer.in_dim)
        {
            return Err(format!(
                "layer {name} weights are not {}x{}",
                layer.out_dim, layer.in_dim
            ));
        }
        if layer.bias.len() != layer.out_dim {
            return Err(format!(
                "layer {name} bias has {} entries, expected {}",
                layer.bias.len(),
                layer.out_dim
            ));
        }
        Ok(Self {
            in_dim: layer.in_dim,
            out_dim: layer.out_dim,
            weights: layer.weights.into_iter().flatten().collect(),
            bias: layer.bias,
        })
    }
}
