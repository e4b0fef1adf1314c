pub mod layer;
pub mod neuron;
pub mod trainer;

use crate::prelude::*;

use crate::matrix::Matrix2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use self::layer::{check_len, Layer, LayerKind};

/// A fully connected tanh network.
///
/// Layer 0 is the input layer and the last layer is the output layer; every
/// layer in between is hidden.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    topology: Vec<usize>,
    learning_rate: f64,
}

impl Network {
    /// Builds a network with `topology[i]` neurons in layer `i` and parameters
    /// drawn from the thread-local RNG.
    pub fn new(topology: &[usize], learning_rate: f64) -> Result<Self> {
        Self::with_rng(topology, learning_rate, &mut rand::thread_rng())
    }

    /// Same as [`Network::new`] with an explicit RNG, for reproducible runs.
    pub fn with_rng<R: Rng + ?Sized>(
        topology: &[usize],
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if topology.len() < 2 {
            return Err(Error::InvalidTopology(format!(
                "need at least an input and an output layer, got {} layer(s)",
                topology.len()
            )));
        }
        if let Some(i) = topology.iter().position(|&n| n == 0) {
            return Err(Error::InvalidTopology(format!("layer {i} has no neurons")));
        }
        validate_rate(learning_rate)?;

        let last = topology.len() - 1;
        let mut layers: Vec<Layer> = topology
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let kind = match i {
                    0 => LayerKind::Input,
                    i if i == last => LayerKind::Output,
                    _ => LayerKind::Hidden,
                };
                Layer::new(kind, n)
            })
            .collect();

        for (i, layer) in layers.iter_mut().enumerate() {
            let previous = i.checked_sub(1);
            let next = (i < last).then_some(i + 1);
            layer.link(previous, next);
        }

        let mut net = Self {
            layers,
            topology: topology.to_vec(),
            learning_rate,
        };
        net.randomize(rng)?;

        tracing::debug!(?topology, learning_rate, "built network");
        Ok(net)
    }

    /// Redraws every weight and bias from N(0, sqrt(2 / (fan_in + fan_out))).
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        for i in 1..self.layers.len() {
            let fan_in = self.layers[i - 1].len();
            let fan_out = self.layers[i].len();
            let std_dev = (2.0 / (fan_in + fan_out) as f64).sqrt();
            let normal = Normal::new(0.0, std_dev)
                .map_err(|e| Error::InvalidTopology(format!("layer {i}: {e}")))?;

            for neuron in self.layers[i].neurons_mut() {
                neuron.set_bias(normal.sample(rng));
                neuron.set_weights((0..fan_in).map(|_| normal.sample(rng)).collect());
            }
        }
        Ok(())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, i: usize) -> Option<&Layer> {
        self.layers.get(i)
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        validate_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    /// Returns the amount of inputs the network accepts
    pub fn input_amount(&self) -> usize {
        self.topology[0]
    }

    /// Returns the amount of outputs the network produces
    pub fn output_amount(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Output activations from the most recent forward pass.
    pub fn output(&self) -> Vec<f64> {
        self.output_layer().activations()
    }

    /// Propagates an input through every layer, overwriting all activations.
    pub fn forward_propagation(&mut self, input: &[f64]) -> Result<()> {
        self.layers[0].forward_input(input)?;

        for i in 1..self.layers.len() {
            if let Some(p) = self.layers[i].previous() {
                let (current, previous) = split_pair(&mut self.layers, i, p);
                current.forward(previous);
            }
        }
        Ok(())
    }

    /// Computes every gradient for `target`, from the output layer back to the
    /// first hidden layer. Requires a preceding forward pass.
    pub fn back_propagation(&mut self, target: &[f64]) -> Result<()> {
        let last = self.layers.len() - 1;
        self.layers[last].backward_target(target)?;

        for i in (1..last).rev() {
            if let Some(n) = self.layers[i].next() {
                let (current, next) = split_pair(&mut self.layers, i, n);
                current.backward(next);
            }
        }
        Ok(())
    }

    /// Applies the delta rule to every non-input neuron using the gradients
    /// from the last backward pass.
    pub fn update_weights_and_biases(&mut self) {
        let rate = self.learning_rate;
        for i in 1..self.layers.len() {
            if let Some(p) = self.layers[i].previous() {
                let (current, previous) = split_pair(&mut self.layers, i, p);
                for neuron in current.neurons_mut() {
                    neuron.apply_update(rate, previous.neurons());
                }
            }
        }
    }

    /// Runs a forward pass and returns the output activations.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.forward_propagation(input)?;
        Ok(self.output())
    }

    /// Index of the strongest output for `input`.
    pub fn predict_class(&mut self, input: &[f64]) -> Result<usize> {
        let output = self.predict(input)?;
        Ok(output
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &x)| {
                if x > best.1 {
                    (i, x)
                } else {
                    best
                }
            })
            .0)
    }

    /// Half sum of squared differences between `target` and the current output activations.
    pub fn calculate_error(&self, target: &[f64]) -> Result<f64> {
        let output = self.output_layer();
        check_len("target", output.len(), target.len())?;

        Ok(output
            .neurons()
            .iter()
            .zip(target)
            .map(|(n, t)| 0.5 * (t - n.activation()).powi(2))
            .sum())
    }

    /// One training step on a single example. Returns the error of the
    /// forward pass made before the update.
    pub fn train_example(&mut self, input: &[f64], target: &[f64]) -> Result<f64> {
        self.forward_propagation(input)?;
        self.back_propagation(target)?;
        self.update_weights_and_biases();
        self.calculate_error(target)
    }

    /// Mean of [`Network::calculate_error`] over every row pair of `inputs` and `targets`.
    pub fn mean_error(&mut self, inputs: &Matrix2<f64>, targets: &Matrix2<f64>) -> Result<f64> {
        check_len("target rows", inputs.rows(), targets.rows())?;
        if inputs.rows() == 0 {
            return Ok(0.0);
        }

        let mut sum = 0.0;
        for (input, target) in inputs.iter_rows().zip(targets.iter_rows()) {
            self.forward_propagation(input)?;
            sum += self.calculate_error(target)?;
        }
        Ok(sum / inputs.rows() as f64)
    }
}

fn validate_rate(learning_rate: f64) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(Error::InvalidLearningRate(learning_rate));
    }
    Ok(())
}

/// Borrows layer `target` mutably and layer `other` immutably. `target != other`.
fn split_pair(layers: &mut [Layer], target: usize, other: usize) -> (&mut Layer, &Layer) {
    if other < target {
        let (head, tail) = layers.split_at_mut(target);
        (&mut tail[0], &head[other])
    } else {
        let (head, tail) = layers.split_at_mut(other);
        (&mut head[target], &tail[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn seeded(topology: &[usize], rate: f64) -> Network {
        let mut rng = StdRng::seed_from_u64(7);
        Network::with_rng(topology, rate, &mut rng).unwrap()
    }

    fn xor_data() -> (Matrix2<f64>, Matrix2<f64>) {
        let inputs = Matrix2::from_array([[0, 0], [0, 1], [1, 0], [1, 1]]).into();
        let targets = Matrix2::from_array([[0], [1], [1], [0]]).into();
        (inputs, targets)
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(matches!(Network::new(&[3], 0.1), Err(Error::InvalidTopology(_))));
        assert!(matches!(Network::new(&[], 0.1), Err(Error::InvalidTopology(_))));
        assert!(matches!(Network::new(&[2, 0, 1], 0.1), Err(Error::InvalidTopology(_))));
        assert_eq!(Network::new(&[2, 1], 0.0).unwrap_err(), Error::InvalidLearningRate(0.0));
        assert!(Network::new(&[2, 1], f64::NAN).is_err());

        let mut net = seeded(&[2, 1], 0.1);
        assert!(net.set_learning_rate(-1.0).is_err());
        assert_eq!(net.learning_rate(), 0.1);
    }

    #[test]
    fn layers_match_topology() {
        for topology in [vec![2, 1], vec![3, 1, 2], vec![2, 4, 1], vec![4, 8, 5, 3], vec![1, 1]] {
            let net = seeded(&topology, 0.01);

            assert_eq!(net.layers().len(), topology.len());
            assert_eq!(net.topology(), &topology[..]);
            for (i, layer) in net.layers().iter().enumerate() {
                assert_eq!(layer.len(), topology[i]);
                if i == 0 {
                    assert_eq!(layer.kind(), LayerKind::Input);
                    assert!(layer.neurons().iter().all(|n| n.weights().is_empty()));
                } else {
                    for n in layer.neurons() {
                        assert_eq!(n.weights().len(), topology[i - 1]);
                    }
                }
            }
            assert_eq!(net.layers().last().unwrap().kind(), LayerKind::Output);
        }
    }

    #[test]
    fn layer_links() {
        let net = seeded(&[2, 3, 3, 1], 0.01);
        let links: Vec<_> = net.layers().iter().map(|l| (l.previous(), l.next())).collect();
        assert_eq!(
            links,
            vec![(None, Some(1)), (Some(0), Some(2)), (Some(1), Some(3)), (Some(2), None)]
        );
        assert_eq!(net.layer(1).unwrap().kind(), LayerKind::Hidden);
        assert!(net.layer(4).is_none());
    }

    #[test]
    fn predict_output_shape() {
        for topology in [vec![2, 1], vec![3, 5, 4], vec![1, 2, 2, 6]] {
            let mut net = seeded(&topology, 0.01);
            let input = vec![0.5; topology[0]];
            let out = net.predict(&input).unwrap();
            assert_eq!(out.len(), *topology.last().unwrap());
            assert!(out.iter().all(|x| x.abs() < 1.0));
        }
    }

    #[test]
    fn same_seed_same_parameters() {
        let a = seeded(&[3, 5, 2], 0.05);
        let b = seeded(&[3, 5, 2], 0.05);
        for (la, lb) in a.layers().iter().zip(b.layers()) {
            assert_eq!(la.neurons(), lb.neurons());
        }

        let mut c = a.clone();
        c.randomize(&mut StdRng::seed_from_u64(8)).unwrap();
        assert_ne!(c.layers()[1].neurons(), a.layers()[1].neurons());
    }

    #[test]
    fn predict_class_picks_largest_output() {
        let mut net = seeded(&[2, 3], 0.05);
        let out = net.predict(&[0.2, -0.1]).unwrap();
        let best = net.predict_class(&[0.2, -0.1]).unwrap();
        assert!(out.iter().all(|&x| x <= out[best]));
    }

    #[test]
    fn predict_is_deterministic() {
        let mut net = seeded(&[3, 4, 2], 0.05);
        let a = net.predict(&[0.1, -0.4, 0.9]).unwrap();
        net.predict(&[1.0, 1.0, 1.0]).unwrap();
        let b = net.predict(&[0.1, -0.4, 0.9]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn shape_mismatch_errors() {
        let mut net = seeded(&[2, 3, 1], 0.05);
        assert_eq!(
            net.predict(&[1.0]),
            Err(Error::DimensionErr {
                context: "input",
                expected: 2,
                actual: 1
            })
        );
        net.forward_propagation(&[1.0, 0.0]).unwrap();
        assert!(matches!(net.back_propagation(&[1.0, 0.0]), Err(Error::DimensionErr { .. })));
        assert!(matches!(net.calculate_error(&[]), Err(Error::DimensionErr { .. })));
    }

    #[test]
    fn error_is_half_squared_distance() {
        let mut net = seeded(&[2, 3, 2], 0.05);
        let out = net.predict(&[0.3, 0.6]).unwrap();

        assert_eq!(net.calculate_error(&out).unwrap(), 0.0);

        let target = [out[0] + 0.5, out[1] - 1.0];
        assert_abs_diff_eq!(net.calculate_error(&target).unwrap(), 0.5 * 0.25 + 0.5 * 1.0, epsilon = 1e-12);
    }

    #[test]
    fn update_follows_delta_rule() {
        let mut net = seeded(&[2, 1], 0.5);
        let before = net.layers()[1].neurons()[0].clone();

        net.forward_propagation(&[1.0, -2.0]).unwrap();
        net.back_propagation(&[1.0]).unwrap();
        net.update_weights_and_biases();

        let a = net.output()[0];
        let g = (1.0 - a) * (1.0 - a * a);
        let after = &net.layers()[1].neurons()[0];
        assert_abs_diff_eq!(after.gradient(), g, epsilon = 1e-12);
        assert_abs_diff_eq!(after.weights()[0], before.weights()[0] + 0.5 * g * 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(after.weights()[1], before.weights()[1] + 0.5 * g * -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(after.bias(), before.bias() + 0.5 * g, epsilon = 1e-12);
    }

    #[test]
    fn single_step_reduces_error() {
        let mut net = seeded(&[2, 3, 1], 0.05);
        let (input, target) = ([0.2, 0.9], [0.5]);

        let before = net.train_example(&input, &target).unwrap();
        net.forward_propagation(&input).unwrap();
        let after = net.calculate_error(&target).unwrap();
        assert!(after < before, "{after} >= {before}");
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut net = seeded(&[2, 3, 2], 0.05);
        let input = [0.4, -0.7];
        let target = [0.25, -0.5];

        net.forward_propagation(&input).unwrap();
        net.back_propagation(&target).unwrap();

        // dE/db = -gradient for every non-input neuron
        let eps = 1e-6;
        for l in 1..net.layers.len() {
            for n in 0..net.layers[l].len() {
                let g = net.layers[l].neurons()[n].gradient();
                let bias = net.layers[l].neurons()[n].bias();

                net.layers[l].neurons_mut()[n].set_bias(bias + eps);
                net.forward_propagation(&input).unwrap();
                let plus = net.calculate_error(&target).unwrap();

                net.layers[l].neurons_mut()[n].set_bias(bias - eps);
                net.forward_propagation(&input).unwrap();
                let minus = net.calculate_error(&target).unwrap();

                net.layers[l].neurons_mut()[n].set_bias(bias);
                assert_abs_diff_eq!(-(plus - minus) / (2.0 * eps), g, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn train_xor() {
        let mut net = seeded(&[2, 6, 1], 0.1);
        let (inputs, targets) = xor_data();

        for _ in 0..5_000 {
            for (input, target) in inputs.iter_rows().zip(targets.iter_rows()) {
                net.train_example(input, target).unwrap();
            }
        }

        let fin = net.mean_error(&inputs, &targets).unwrap();
        assert!(fin < 0.05, "final error {fin}");

        for (input, target) in inputs.iter_rows().zip(targets.iter_rows()) {
            let out = net.predict(input).unwrap()[0];
            assert!((out - target[0]).abs() < 0.5, "{input:?} -> {out}");
        }
    }
}
