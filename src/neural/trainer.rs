use std::sync::mpsc::Sender;

use crate::{
    matrix::Matrix2,
    neural::{layer::check_len, Network},
    prelude::*,
};

#[cfg(feature = "gui")]
use crate::viz::Visualizer;

/// State sent on each logged epoch of training
/// (epoch, mean error, outputs for every training row)
pub type IterationState = (usize, f64, Matrix2<f64>);

/// Per-epoch mean errors collected by [`Trainer::train`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingReport {
    pub epoch_errors: Vec<f64>,
}

impl TrainingReport {
    /// Mean error of the last epoch, if any epoch ran.
    pub fn final_error(&self) -> Option<f64> {
        self.epoch_errors.last().copied()
    }
}

/// Drives per-example training over a dataset for a fixed number of epochs.
///
/// Examples are visited in row order every epoch. The error recorded for an
/// example is the one of its forward pass, before its own update.
pub struct Trainer {
    epochs: usize,
    epochs_per_log: Option<usize>,
}

impl Trainer {
    pub fn new(epochs: usize) -> Self {
        Self {
            epochs,
            epochs_per_log: None,
        }
    }

    /// Log the mean error every `epochs_per_log` epochs.
    pub fn with_log(mut self, epochs_per_log: Option<usize>) -> Self {
        self.epochs_per_log = epochs_per_log.filter(|&n| n > 0);
        self
    }

    pub fn set_epochs(&mut self, epochs: usize) {
        self.epochs = epochs;
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn train(
        &self,
        net: &mut Network,
        inputs: &Matrix2<f64>,
        targets: &Matrix2<f64>,
    ) -> Result<TrainingReport> {
        check_dataset(net, inputs, targets)?;

        let mut report = TrainingReport {
            epoch_errors: Vec::with_capacity(self.epochs),
        };
        for epoch in 0..self.epochs {
            let mean = self.epoch(net, inputs, targets)?;
            report.epoch_errors.push(mean);

            if self.should_log(epoch) {
                tracing::info!("epoch {epoch}: error = {mean}");
            }
        }
        Ok(report)
    }

    /// Like [`Trainer::train`], also sending the state of every logged epoch to `tx`.
    ///
    /// Once the receiving side hangs up, states are no longer computed and the
    /// remaining epochs run as in [`Trainer::train`].
    pub fn train_with_progress(
        &self,
        net: &mut Network,
        inputs: &Matrix2<f64>,
        targets: &Matrix2<f64>,
        tx: &Sender<IterationState>,
    ) -> Result<TrainingReport> {
        check_dataset(net, inputs, targets)?;

        let mut report = TrainingReport {
            epoch_errors: Vec::with_capacity(self.epochs),
        };
        let mut connected = true;
        for epoch in 0..self.epochs {
            let mean = self.epoch(net, inputs, targets)?;
            report.epoch_errors.push(mean);

            if self.should_log(epoch) {
                tracing::info!("epoch {epoch}: error = {mean}");
                if connected {
                    let outputs = predict_all(net, inputs)?;
                    if tx.send((epoch, mean, outputs)).is_err() {
                        tracing::debug!(epoch, "progress receiver closed");
                        connected = false;
                    }
                }
            }
        }
        Ok(report)
    }

    /// Trains on a worker thread while `Gui` plots the error curve.
    ///
    /// Closing the window does not stop training.
    #[cfg(feature = "gui")]
    pub fn train_gui<Gui: Visualizer>(
        &self,
        net: &mut Network,
        inputs: &Matrix2<f64>,
        targets: &Matrix2<f64>,
    ) -> Result<TrainingReport> {
        check_dataset(net, inputs, targets)?;

        std::thread::scope(|scope| -> Result<TrainingReport> {
            let (tx, rx) = std::sync::mpsc::channel();
            let handle = scope.spawn(move || self.train_with_progress(net, inputs, targets, &tx));

            let _ = eframe::run_native(
                "rust_backprop",
                eframe::NativeOptions::default(),
                Box::new(|cc| Box::new(Gui::new(cc, rx))),
            );

            handle.join().map_err(|_| Error::ThreadErr)?
        })
    }

    fn should_log(&self, epoch: usize) -> bool {
        self.epochs_per_log.is_some_and(|every| epoch % every == 0)
    }

    fn epoch(&self, net: &mut Network, inputs: &Matrix2<f64>, targets: &Matrix2<f64>) -> Result<f64> {
        let mut total = 0.0;
        for (input, target) in inputs.iter_rows().zip(targets.iter_rows()) {
            total += net.train_example(input, target)?;
        }
        Ok(total / inputs.rows().max(1) as f64)
    }
}

/// Outputs of `net` for every row of `inputs`.
pub fn predict_all(net: &mut Network, inputs: &Matrix2<f64>) -> Result<Matrix2<f64>> {
    let rows = inputs
        .iter_rows()
        .map(|input| net.predict(input))
        .collect::<Result<Vec<_>>>()?;
    if rows.is_empty() {
        return Ok(Matrix2::new(0, net.output_amount()));
    }
    Matrix2::from_vec(rows)
}

fn check_dataset(net: &Network, inputs: &Matrix2<f64>, targets: &Matrix2<f64>) -> Result<()> {
    check_len("target rows", inputs.rows(), targets.rows())?;
    check_len("input", net.input_amount(), inputs.cols())?;
    check_len("target", net.output_amount(), targets.cols())
}
