//! A small dense feed-forward network.
//!
//! Hidden layers use `tanh`; the output layer is linear.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// One fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Input width.
    pub inputs: usize,
    /// Output width.
    pub outputs: usize,
    /// `outputs * inputs` weights, row-major by output.
    pub weights: Vec<f64>,
    /// One bias per output.
    pub biases: Vec<f64>,
}

impl Layer {
    /// A layer with weights and biases drawn uniformly from `[-1, 1)`.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        Self {
            inputs,
            outputs,
            weights: (0..inputs * outputs).map(|_| rng.gen_range(-1.0..1.0)).collect(),
            biases: (0..outputs).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }
    }

    /// Whether the weight and bias buffers match the declared widths.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.weights.len() == self.inputs * self.outputs && self.biases.len() == self.outputs
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .chunks_exact(self.inputs.max(1))
            .zip(&self.biases)
            .map(|(row, bias)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias)
            .collect()
    }
}

/// Layers applied in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Network {
    /// Hidden layers followed by the output layer.
    pub layers: Vec<Layer>,
}

impl Network {
    /// A random network with the given layer widths, input first.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(widths: &[usize], rng: &mut R) -> Self {
        Self {
            layers: widths
                .windows(2)
                .map(|pair| Layer::random(pair[0], pair[1], rng))
                .collect(),
        }
    }

    /// Layer widths, input first. Empty for a network without layers.
    #[must_use]
    pub fn widths(&self) -> Vec<usize> {
        let Some(first) = self.layers.first() else {
            return Vec::new();
        };
        std::iter::once(first.inputs)
            .chain(self.layers.iter().map(|layer| layer.outputs))
            .collect()
    }

    /// Input width, 0 for a network without layers.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.inputs)
    }

    /// Evaluate the network.
    #[must_use]
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let last = self.layers.len().saturating_sub(1);
        self.layers
            .iter()
            .enumerate()
            .fold(input.to_vec(), |activations, (index, layer)| {
                let mut output = layer.forward(&activations);
                if index < last {
                    output.iter_mut().for_each(|value| *value = value.tanh());
                }
                output
            })
    }

    /// Layers `[0, n/2)` from `first`, the rest from `second`.
    ///
    /// Both networks must share the same shape.
    #[must_use]
    pub fn crossover(first: &Self, second: &Self) -> Self {
        let count = first.layers.len();
        Self {
            layers: first
                .layers
                .iter()
                .zip(&second.layers)
                .enumerate()
                .map(|(index, (a, b))| if index * 2 < count { a.clone() } else { b.clone() })
                .collect(),
        }
    }

    /// Copy where every weight and bias, with probability `rate`, is shifted
    /// by a uniform amount in `[-power, power]`.
    #[must_use]
    pub fn mutated<R: Rng + ?Sized>(&self, rate: f64, power: f64, rng: &mut R) -> Self {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        let power = power.abs();
        let mut mutate = |value: f64| {
            if power.is_finite() && power > 0.0 && rng.gen_bool(rate) {
                value + rng.gen_range(-power..=power)
            } else {
                value
            }
        };

        Self {
            layers: self
                .layers
                .iter()
                .map(|layer| Layer {
                    inputs: layer.inputs,
                    outputs: layer.outputs,
                    weights: layer.weights.iter().map(|&w| mutate(w)).collect(),
                    biases: layer.biases.iter().map(|&b| mutate(b)).collect(),
                })
                .collect(),
        }
    }
}

/// Index of the largest value; the first one wins ties. `None` when empty.
#[must_use]
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, &value)| match best {
            Some((_, top)) if value <= top => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_layer(inputs: usize, outputs: usize, weight: f64, bias: f64) -> Layer {
        Layer {
            inputs,
            outputs,
            weights: vec![weight; inputs * outputs],
            biases: vec![bias; outputs],
        }
    }

    #[test]
    fn test_random_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let network = Network::random(&[5, 4, 3], &mut rng);

        assert_eq!(network.widths(), vec![5, 4, 3]);
        assert_eq!(network.input_count(), 5);
        assert!(network.layers.iter().all(Layer::is_consistent));
        assert!(network.layers[0].weights.iter().all(|w| (-1.0..1.0).contains(w)));
    }

    #[test]
    fn test_forward() {
        let network = Network {
            layers: vec![constant_layer(2, 2, 0.0, 0.5), constant_layer(2, 1, 1.0, 1.0)],
        };

        let output = network.forward(&[3.0, 4.0]);

        // Hidden: tanh(0.5) twice; output: 2 * tanh(0.5) + 1.
        assert_eq!(output.len(), 1);
        assert!((output[0] - (2.0 * 0.5_f64.tanh() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_crossover_takes_leading_layers_from_first_parent() {
        let first = Network {
            layers: vec![
                constant_layer(1, 1, 1.0, 1.0),
                constant_layer(1, 1, 1.0, 1.0),
                constant_layer(1, 1, 1.0, 1.0),
            ],
        };
        let second = Network {
            layers: vec![
                constant_layer(1, 1, 2.0, 2.0),
                constant_layer(1, 1, 2.0, 2.0),
                constant_layer(1, 1, 2.0, 2.0),
            ],
        };

        let child = Network::crossover(&first, &second);

        assert_eq!(child.layers[0], first.layers[0]);
        assert_eq!(child.layers[1], first.layers[1]);
        assert_eq!(child.layers[2], second.layers[2]);
    }

    #[test]
    fn test_mutation_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        let network = Network::random(&[10, 10, 3], &mut rng);

        let unchanged = network.mutated(0.0, 0.1, &mut rng);
        assert_eq!(unchanged, network);

        let mutated = network.mutated(1.0, 0.1, &mut rng);
        assert_eq!(mutated.widths(), network.widths());
        for (before, after) in network.layers.iter().zip(&mutated.layers) {
            for (w0, w1) in before.weights.iter().zip(&after.weights) {
                assert!((w1 - w0).abs() <= 0.1 + 1e-12);
            }
        }
        assert_ne!(mutated, network);
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.1, 0.9, 0.3]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[-3.0, -2.0]), Some(1));
    }
}
