use crate::prelude::*;

use super::neuron::Neuron;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Input,
    Hidden,
    Output,
}

/// An ordered group of neurons.
///
/// `previous` and `next` are indices into the owning network's layer list,
/// fixed at construction.
#[derive(Debug, Clone)]
pub struct Layer {
    kind: LayerKind,
    neurons: Vec<Neuron>,
    previous: Option<usize>,
    next: Option<usize>,
}

impl Layer {
    /// Creates a layer of `n_neurons` zeroed neurons with no links.
    pub(crate) fn new(kind: LayerKind, n_neurons: usize) -> Self {
        Self {
            kind,
            neurons: vec![Neuron::new(); n_neurons],
            previous: None,
            next: None,
        }
    }

    pub(crate) fn link(&mut self, previous: Option<usize>, next: Option<usize>) {
        self.previous = previous;
        self.next = next;
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neuron(&self, i: usize) -> Option<&Neuron> {
        self.neurons.get(i)
    }

    /// Returns the amount of neurons in the layer
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    /// Activations of every neuron, in order.
    pub fn activations(&self) -> Vec<f64> {
        self.neurons.iter().map(Neuron::activation).collect()
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    /// Injects an external input vector. Input layers only.
    pub(crate) fn forward_input(&mut self, input: &[f64]) -> Result<()> {
        self.expect_kind(LayerKind::Input)?;
        check_len("input", self.len(), input.len())?;

        for (neuron, &x) in self.neurons.iter_mut().zip(input) {
            neuron.set_value(x);
            neuron.set_activation(x);
        }
        Ok(())
    }

    /// Recomputes every activation from the previous layer's activations.
    /// A no-op for the input layer, whose activations come from `forward_input`.
    pub(crate) fn forward(&mut self, previous: &Layer) {
        match self.kind {
            LayerKind::Input => {}
            LayerKind::Hidden | LayerKind::Output => {
                for neuron in self.neurons.iter_mut() {
                    let z = neuron.weighted_sum(&previous.neurons);
                    neuron.set_activation(Neuron::tanh_activation(z));
                }
            }
        }
    }

    /// Propagates gradients from the next layer through its weights.
    /// Only hidden layers do anything here: the output layer is seeded by
    /// `backward_target` and the input layer has no gradients.
    pub(crate) fn backward(&mut self, next: &Layer) {
        match self.kind {
            LayerKind::Input | LayerKind::Output => {}
            LayerKind::Hidden => {
                for (i, neuron) in self.neurons.iter_mut().enumerate() {
                    let downstream: f64 = next
                        .neurons
                        .iter()
                        .map(|n| n.weights()[i] * n.gradient())
                        .sum();
                    let d = Neuron::tanh_derivative_from_activation(neuron.activation());
                    neuron.set_gradient(downstream * d);
                }
            }
        }
    }

    /// Seeds output gradients from the target vector. Output layers only.
    pub(crate) fn backward_target(&mut self, target: &[f64]) -> Result<()> {
        self.expect_kind(LayerKind::Output)?;
        check_len("target", self.len(), target.len())?;

        for (neuron, &t) in self.neurons.iter_mut().zip(target) {
            let error = t - neuron.activation();
            let d = Neuron::tanh_derivative_from_activation(neuron.activation());
            neuron.set_gradient(error * d);
        }
        Ok(())
    }

    fn expect_kind(&self, expected: LayerKind) -> Result<()> {
        if self.kind != expected {
            return Err(Error::LayerKind {
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }
}

pub(crate) fn check_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionErr {
            context,
            expected,
            actual,
        });
    }
    Ok(())
}
