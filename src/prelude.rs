use thiserror::Error;

/// Error type for rust_backprop
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Indicates some vector or matrix has the wrong length for the operation.
    #[error("{context}: expected length {expected}, got {actual}")]
    DimensionErr {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("learning rate must be finite and positive, got {0}")]
    InvalidLearningRate(f64),

    /// A payload operation (input injection, target seeding) was called on the wrong layer kind.
    #[error("operation requires a {expected:?} layer, found {actual:?}")]
    LayerKind {
        expected: crate::neural::layer::LayerKind,
        actual: crate::neural::layer::LayerKind,
    },

    #[error("failed to read {source_name}: {reason}")]
    ReadErr { source_name: String, reason: String },

    #[error("no numeric rows in {0}")]
    EmptyDataset(String),

    #[error("row {row} has {actual} numeric cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The training thread or its channel to the GUI failed.
    #[error("training thread failed")]
    ThreadErr,
}

pub type Result<T> = std::result::Result<T, Error>;
