//! Dataset helpers that sit in front of the network: CSV ingestion and
//! min-max feature scaling.

pub mod loader;
pub mod normalize;

pub use loader::{one_hot, CsvLoader, LabelledData};
pub use normalize::{normalize_input, normalize_matrix, MinMax};
