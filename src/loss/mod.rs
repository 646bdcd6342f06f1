pub mod euclidean;
pub mod layer;
pub mod weighted_euclidean;

pub use euclidean::EuclideanLoss;
pub use layer::{reshape_loss_base, LossLayer};
pub use weighted_euclidean::{GradientRequest, WeightedEuclideanLoss};
