use std::{
    collections::VecDeque,
    sync::{mpsc::Receiver, Arc, Mutex, PoisonError},
    thread,
};

use eframe::CreationContext;
use egui::plot::{Line, Plot};

pub use crate::neural::trainer::IterationState;

/// Any type that can be rendered and updated during training
pub trait Visualizer: eframe::App + 'static {
    const DATA_LIMIT: usize = 20_000;
    fn new(cc: &CreationContext, rx: Receiver<IterationState>) -> Self;
}

/// Plots the mean error per logged epoch.
pub struct ErrorPlot {
    data: Arc<Mutex<VecDeque<IterationState>>>,
}

impl Visualizer for ErrorPlot {
    /// Spawns a listener thread that appends every received state and asks for a repaint.
    fn new(cc: &CreationContext, rx: Receiver<IterationState>) -> Self {
        let data = Arc::new(Mutex::new(VecDeque::new()));
        let data_clone = data.clone();

        let ctx = cc.egui_ctx.clone();
        thread::spawn(move || {
            // ends once the training thread drops its sender
            for state in rx {
                let mut data = data_clone.lock().unwrap_or_else(PoisonError::into_inner);

                if data.len() == Self::DATA_LIMIT {
                    data.pop_front();
                }

                data.push_back(state);
                ctx.request_repaint()
            }
        });

        Self { data }
    }
}

impl eframe::App for ErrorPlot {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let points = error_points(&self.get_data());
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical(|ui| {
                let [epoch, error] = points.last().copied().unwrap_or([0.0, f64::INFINITY]);
                ui.heading(format!("Epoch {} error: {error}", epoch as usize));
                Plot::new("Error").show(ui, |plot_ui| plot_ui.line(Line::new(points)));
            });
        });
    }
}

impl ErrorPlot {
    /// Returns a clone of the data as a vec
    /// Blocks until it can get a lock on its state data
    pub fn get_data(&self) -> Vec<IterationState> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// `[epoch, error]` pairs in plotting order.
pub fn error_points(states: &[IterationState]) -> Vec<[f64; 2]> {
    states
        .iter()
        .map(|(epoch, error, _)| [*epoch as f64, *error])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix2;

    #[test]
    fn points_follow_states() {
        let states = vec![
            (0, 0.5, Matrix2::new(4, 1)),
            (100, 0.25, Matrix2::new(4, 1)),
        ];
        assert_eq!(error_points(&states), vec![[0.0, 0.5], [100.0, 0.25]]);
    }
}
