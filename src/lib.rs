pub mod error;
pub mod loss;
pub mod math;
pub mod registry;

// Convenience re-exports
pub use error::{LossError, Result};
pub use loss::{EuclideanLoss, GradientRequest, LossLayer, WeightedEuclideanLoss};
pub use math::{Blob, DType, Element, Filler};
pub use registry::{LayerRegistry, LayerSpec};
