//! The feed-forward autoencoder.
//!
//! ```text
//! input ─ encoder.0 ─ ReLU ─ encoder.1 ─ ReLU ─ encoder.2 ─▶ embedding
//! embedding ─ decoder.0 ─ ReLU ─ decoder.1 ─ ReLU ─ decoder.2 ─▶ reconstruction
//! ```
//!
//! Hidden widths are configurable (default 512, 256); the decoder mirrors
//! the encoder. There is no activation after the embedding layer nor after
//! the reconstruction layer. Training minimizes the mean squared error
//! between input and reconstruction; at serving time only the encoder half
//! runs.

use crate::error::{ModelError, Result};
use crate::layer::{Dense, DenseGrads, LayerWeights};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Samples per parallel gradient chunk. Fixed so the summation order, and
/// therefore a seeded training run, does not depend on the thread count.
const GRADIENT_CHUNK: usize = 16;

/// Encoder/decoder stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ModelWeights", try_from = "ModelWeights")]
pub struct Autoencoder {
    /// Encoder layers followed by decoder layers
    layers: Vec<Dense>,
    encoder_depth: usize,
}

/// Persisted model: layers keyed by name (`encoder.0`, ..., `decoder.2`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub input_dim: usize,
    pub embedding_dim: usize,
    pub layers: BTreeMap<String, LayerWeights>,
}

/// Summed gradients and squared error over a set of samples
pub(crate) struct BatchGradients {
    pub layers: Vec<DenseGrads>,
    pub squared_error: f64,
}

impl Autoencoder {
    /// Build a freshly initialized model.
    pub fn new<R: Rng>(
        input_dim: usize,
        hidden_dims: &[usize],
        embedding_dim: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if input_dim == 0 || embedding_dim == 0 || hidden_dims.contains(&0) {
            return Err(ModelError::InvalidConfig(
                "layer widths must be at least 1".to_string(),
            ));
        }

        let widths: Vec<usize> = std::iter::once(input_dim)
            .chain(hidden_dims.iter().copied())
            .chain(std::iter::once(embedding_dim))
            .chain(hidden_dims.iter().rev().copied())
            .chain(std::iter::once(input_dim))
            .collect();

        let layers = widths
            .windows(2)
            .map(|w| Dense::init(w[0], w[1], rng))
            .collect();

        Ok(Self {
            layers,
            encoder_depth: hidden_dims.len() + 1,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    pub fn embedding_dim(&self) -> usize {
        self.layers[self.encoder_depth - 1].out_dim()
    }

    pub fn hidden_dims(&self) -> Vec<usize> {
        self.layers[..self.encoder_depth - 1]
            .iter()
            .map(Dense::out_dim)
            .collect()
    }

    fn layer_name(&self, index: usize) -> String {
        if index < self.encoder_depth {
            format!("encoder.{index}")
        } else {
            format!("decoder.{}", index - self.encoder_depth)
        }
    }

    /// ReLU follows every layer except the embedding and reconstruction layers
    fn has_activation(&self, index: usize) -> bool {
        index + 1 != self.encoder_depth && index + 1 != self.layers.len()
    }

    fn check_input(&self, x: &[f32]) -> Result<()> {
        if x.len() != self.input_dim() {
            return Err(ModelError::InputWidth {
                expected: self.input_dim(),
                actual: x.len(),
            });
        }
        Ok(())
    }

    /// Run layers `range`, returning every intermediate activation (the input
    /// included).
    fn activations(&self, x: &[f32], range: std::ops::Range<usize>) -> Vec<Vec<f32>> {
        let mut acts = Vec::with_capacity(range.len() + 1);
        acts.push(x.to_vec());
        for index in range {
            let mut out = self.layers[index].forward(&acts[acts.len() - 1]);
            if self.has_activation(index) {
                out.iter_mut().for_each(|v| *v = v.max(0.0));
            }
            acts.push(out);
        }
        acts
    }

    /// Encoder half only
    pub fn embed(&self, x: &[f32]) -> Result<Vec<f32>> {
        self.check_input(x)?;
        let mut acts = self.activations(x, 0..self.encoder_depth);
        Ok(acts.pop().unwrap_or_default())
    }

    /// Embed many rows in parallel, keeping their order
    pub fn embed_batch(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        rows.par_iter().map(|row| self.embed(row)).collect()
    }

    /// Returns `(reconstruction, embedding)`
    pub fn forward(&self, x: &[f32]) -> Result<(Vec<f32>, Vec<f32>)> {
        self.check_input(x)?;
        let mut acts = self.activations(x, 0..self.layers.len());
        let reconstruction = acts.pop().unwrap_or_default();
        let embedding = acts.swap_remove(self.encoder_depth);
        Ok((reconstruction, embedding))
    }

    /// Mean squared reconstruction error over `rows`
    pub fn reconstruction_loss(&self, rows: &[&[f32]]) -> Result<f32> {
        let mut total = 0.0f64;
        for row in rows {
            let (reconstruction, _) = self.forward(row)?;
            total += squared_error(&reconstruction, row);
        }
        Ok((total / (rows.len() * self.input_dim()).max(1) as f64) as f32)
    }

    /// Gradients of the batch MSE with respect to every parameter.
    ///
    /// Samples are split into fixed chunks processed in parallel; chunk
    /// results are summed in chunk order.
    pub(crate) fn gradients(&self, batch: &[&[f32]]) -> Result<BatchGradients> {
        for row in batch {
            self.check_input(row)?;
        }
        let scale = 2.0 / (batch.len() * self.input_dim()) as f32;

        let partials: Vec<BatchGradients> = batch
            .par_chunks(GRADIENT_CHUNK)
            .map(|chunk| {
                let mut acc = self.zero_gradients();
                for row in chunk {
                    acc.squared_error += self.backprop_sample(row, scale, &mut acc.layers);
                }
                acc
            })
            .collect();

        let mut total = self.zero_gradients();
        for partial in &partials {
            total.squared_error += partial.squared_error;
            for (t, p) in total.layers.iter_mut().zip(&partial.layers) {
                t.add_assign(p);
            }
        }
        Ok(total)
    }

    fn zero_gradients(&self) -> BatchGradients {
        BatchGradients {
            layers: self.layers.iter().map(DenseGrads::zeros_like).collect(),
            squared_error: 0.0,
        }
    }

    /// Backpropagate one sample, returning its squared error
    fn backprop_sample(&self, x: &[f32], scale: f32, grads: &mut [DenseGrads]) -> f64 {
        let acts = self.activations(x, 0..self.layers.len());
        let reconstruction = &acts[self.layers.len()];

        let mut delta: Vec<f32> = reconstruction
            .iter()
            .zip(x)
            .map(|(r, t)| scale * (r - t))
            .collect();

        for index in (0..self.layers.len()).rev() {
            if self.has_activation(index) {
                for (d, a) in delta.iter_mut().zip(&acts[index + 1]) {
                    if *a <= 0.0 {
                        *d = 0.0;
                    }
                }
            }
            let input_grad =
                self.layers[index].backward(&acts[index], &delta, &mut grads[index], index > 0);
            match input_grad {
                Some(g) => delta = g,
                None => break,
            }
        }

        squared_error(reconstruction, x)
    }

    /// Mutable `(weights, bias)` of every layer, for the optimizer
    pub(crate) fn parameters_mut(&mut self) -> impl Iterator<Item = (&mut [f32], &mut [f32])> {
        self.layers
            .iter_mut()
            .map(|l| (l.weights.as_mut_slice(), l.bias.as_mut_slice()))
    }

    pub(crate) fn layer_sizes(&self) -> Vec<(usize, usize)> {
        self.layers
            .iter()
            .map(|l| (l.weights.len(), l.bias.len()))
            .collect()
    }
}

fn squared_error(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(x - y).powi(2))
        .sum()
}

impl From<Autoencoder> for ModelWeights {
    fn from(model: Autoencoder) -> Self {
        let layers = model
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (model.layer_name(i), layer.to_weights()))
            .collect();
        ModelWeights {
            input_dim: model.input_dim(),
            embedding_dim: model.embedding_dim(),
            layers,
        }
    }
}

impl TryFrom<ModelWeights> for Autoencoder {
    type Error = ModelError;

    fn try_from(mut weights: ModelWeights) -> Result<Self> {
        let count = |prefix: &str| weights.layers.keys().filter(|k| k.starts_with(prefix)).count();
        let encoder_depth = count("encoder.");
        let decoder_depth = count("decoder.");

        if encoder_depth == 0 || encoder_depth != decoder_depth {
            return Err(ModelError::InvalidWeights(format!(
                "expected matching encoder/decoder stacks, found {encoder_depth} and {decoder_depth} layers"
            )));
        }
        if weights.layers.len() != encoder_depth * 2 {
            return Err(ModelError::InvalidWeights(
                "unexpected layer names".to_string(),
            ));
        }

        let names = (0..encoder_depth)
            .map(|i| format!("encoder.{i}"))
            .chain((0..decoder_depth).map(|i| format!("decoder.{i}")));

        let mut layers = Vec::with_capacity(encoder_depth * 2);
        for name in names {
            let layer = weights
                .layers
                .remove(&name)
                .ok_or_else(|| ModelError::InvalidWeights(format!("missing layer {name}")))?;
            let dense = Dense::from_weights(&name, layer).map_err(ModelError::InvalidWeights)?;

            if let Some(prev) = layers.last().map(|l: &Dense| l.out_dim()) {
                if prev != dense.in_dim() {
                    return Err(ModelError::InvalidWeights(format!(
                        "layer {name} takes {} inputs but the previous layer emits {prev}",
                        dense.in_dim()
                    )));
                }
            }
            layers.push(dense);
        }

        let model = Autoencoder {
            layers,
            encoder_depth,
        };
        if model.input_dim() != weights.input_dim
            || model.embedding_dim() != weights.embedding_dim
            || model.layers[model.layers.len() - 1].out_dim() != weights.input_dim
        {
            return Err(ModelError::InvalidWeights(format!(
                "layers do not map {} -> {} -> {}",
                weights.input_dim, weights.embedding_dim, weights.input_dim
            )));
        }
        Ok(model)
    }
}
