use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::utils::traits::Policy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// One row of input weights per output neuron.
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl Layer {
    fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        // Keep the initial pre-activations in the sigmoid's useful range.
        let bound = 1.0 / (inputs.max(1) as f64).sqrt();
        Self {
            weights: (0..outputs)
                .map(|_| (0..inputs).map(|_| rng.gen_range(-bound..=bound)).collect())
                .collect(),
            biases: (0..outputs).map(|_| rng.gen_range(-bound..=bound)).collect(),
        }
    }

    fn fan_in(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                sigmoid(sum + bias)
            })
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Fully-connected network with sigmoid activations. Inputs are multiplied
/// by `input_scale` first so raw transmit powers land near unit range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    layers: Vec<Layer>,
    input_size: usize,
    input_scale: f64,
}

impl FeedForwardNetwork {
    pub fn random<R: Rng + ?Sized>(
        input_size: usize,
        hidden_layers: usize,
        hidden_size: usize,
        output_size: usize,
        input_scale: f64,
        rng: &mut R,
    ) -> Self {
        let mut sizes = vec![input_size];
        sizes.extend(std::iter::repeat(hidden_size).take(hidden_layers));
        sizes.push(output_size);

        let layers = sizes
            .windows(2)
            .map(|pair| Layer::random(pair[0], pair[1], rng))
            .collect();

        Self {
            layers,
            input_size,
            input_scale,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(self.input_size, |l| l.biases.len())
    }

    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.biases.len() * (l.fan_in() + 1))
            .sum()
    }

    pub fn feed_forward(&self, input: &[f64]) -> Vec<f64> {
        let mut activations: Vec<f64> = input
            .iter()
            .take(self.input_size)
            .map(|x| x * self.input_scale)
            .collect();
        activations.resize(self.input_size, 0.0);

        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        activations
    }

    /// Perturbs each parameter with probability `rate` by a uniform amount
    /// in `[-scale, scale]` divided by the layer's fan-in.
    /// Non-finite `rate` or `scale` leaves the network unchanged.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, scale: f64, rng: &mut R) {
        if !rate.is_finite() || !scale.is_finite() {
            return;
        }
        for layer in &mut self.layers {
            let step = scale / (layer.fan_in().max(1) as f64);
            let params = layer
                .weights
                .iter_mut()
                .flat_map(|row| row.iter_mut())
                .chain(layer.biases.iter_mut());
            for param in params {
                if rng.gen_bool(rate.clamp(0.0, 1.0)) {
                    *param += rng.gen_range(-step..=step);
                }
            }
        }
    }
}

impl Policy for FeedForwardNetwork {
    fn predict(&self, observation: &[f64]) -> Vec<f64> {
        self.feed_forward(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network(seed: u64) -> FeedForwardNetwork {
        let mut rng = StdRng::seed_from_u64(seed);
        FeedForwardNetwork::random(7, 1, 4, 2, 1e-5, &mut rng)
    }

    #[test]
    fn shape_matches_request() {
        let net = network(1);
        assert_eq!(net.input_size(), 7);
        assert_eq!(net.output_size(), 2);
        assert_eq!(net.parameter_count(), 4 * 8 + 2 * 5);
    }

    #[test]
    fn outputs_are_probabilities() {
        let net = network(2);
        let output = net.predict(&[650_000.0, 0.0, 200_000.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(output.len(), 2);
        assert!(output.iter().all(|o| (0.0..=1.0).contains(o)));
    }

    #[test]
    fn short_input_is_zero_padded() {
        let net = network(3);
        assert_eq!(net.predict(&[1.0]), net.predict(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn zero_rate_mutation_is_identity() {
        let mut net = network(4);
        let before = net.clone();
        let mut rng = StdRng::seed_from_u64(9);
        net.mutate(0.0, 10.0, &mut rng);
        assert_eq!(net, before);
        net.mutate(1.0, 10.0, &mut rng);
        assert_ne!(net, before);
    }

    #[test]
    fn non_finite_mutation_is_ignored() {
        let mut net = network(5);
        let before = net.clone();
        let mut rng = StdRng::seed_from_u64(10);
        net.mutate(f64::NAN, 10.0, &mut rng);
        net.mutate(0.5, f64::NAN, &mut rng);
        assert_eq!(net, before);
    }
}
