pub mod registry;
pub mod spec;

pub use registry::{LayerCreator, LayerRegistry};
pub use spec::LayerSpec;
