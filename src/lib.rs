pub mod data;
pub mod matrix;
pub mod neural;
pub mod prelude;
#[cfg(feature = "gui")]
pub mod viz;

pub use neural::{trainer::Trainer, Network};
