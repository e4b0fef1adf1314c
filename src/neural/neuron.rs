/// A single unit of a layer.
///
/// Holds the state of the most recent forward/backward pass and the weights
/// connecting it to every neuron of the previous layer, in that layer's order.
/// Input neurons carry no weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neuron {
    value: f64,
    bias: f64,
    activation: f64,
    gradient: f64,
    weights: Vec<f64>,
}

impl Neuron {
    /// Creates a neuron with zeroed state and no weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hyperbolic tangent activation.
    pub fn tanh_activation(x: f64) -> f64 {
        x.tanh()
    }

    /// Derivative of tanh at the pre-activation input `x`.
    pub fn tanh_derivative(x: f64) -> f64 {
        let t = Self::tanh_activation(x);
        1.0 - t * t
    }

    /// Derivative of tanh expressed through an already computed activation `a = tanh(x)`.
    pub fn tanh_derivative_from_activation(a: f64) -> f64 {
        1.0 - a * a
    }

    /// Raw input value. Only meaningful for input neurons.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn activation(&self) -> f64 {
        self.activation
    }

    /// Local error signal, dError/dWeightedSum, from the last backward pass.
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub(crate) fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub(crate) fn set_activation(&mut self, activation: f64) {
        self.activation = activation;
    }

    pub(crate) fn set_gradient(&mut self, gradient: f64) {
        self.gradient = gradient;
    }

    pub(crate) fn set_weights(&mut self, weights: Vec<f64>) {
        self.weights = weights;
    }

    /// Weighted sum of the previous layer's activations plus bias.
    pub(crate) fn weighted_sum(&self, inputs: &[Neuron]) -> f64 {
        self.weights
            .iter()
            .zip(inputs)
            .map(|(w, n)| w * n.activation)
            .sum::<f64>()
            + self.bias
    }

    /// Delta rule step: `w_j += rate * gradient * a_j`, `b += rate * gradient`.
    pub(crate) fn apply_update(&mut self, rate: f64, inputs: &[Neuron]) {
        let step = rate * self.gradient;
        for (w, n) in self.weights.iter_mut().zip(inputs) {
            *w += step * n.activation;
        }
        self.bias += step;
    }
}
