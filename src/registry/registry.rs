use std::collections::HashMap;

use tracing::debug;

use crate::error::{LossError, Result};
use crate::loss::{EuclideanLoss, LossLayer, WeightedEuclideanLoss};
use crate::math::element::Element;
use crate::registry::spec::LayerSpec;

/// Builds a boxed layer from its spec.
pub type LayerCreator<T> = fn(&LayerSpec) -> Box<dyn LossLayer<T>>;

/// Lookup table from layer type name to constructor, one table per element
/// type. The element type half of the key is `T::DTYPE`, checked against
/// the spec on every `create`.
pub struct LayerRegistry<T: Element> {
    creators: HashMap<String, LayerCreator<T>>,
}

impl<T: Element> LayerRegistry<T> {
    pub fn new() -> Self {
        LayerRegistry { creators: HashMap::new() }
    }

    /// Registry pre-populated with the loss layers this crate ships.
    pub fn with_builtin() -> Self {
        let mut registry = LayerRegistry::new();
        registry.creators.insert("WeightedEuclideanLoss".to_string(), create_weighted_euclidean::<T>);
        registry.creators.insert("EuclideanLoss".to_string(), create_euclidean::<T>);
        registry
    }

    pub fn register(&mut self, layer_type: &str, creator: LayerCreator<T>) -> Result<()> {
        if self.creators.contains_key(layer_type) {
            return Err(LossError::DuplicateLayerType(layer_type.to_string()));
        }
        self.creators.insert(layer_type.to_string(), creator);
        Ok(())
    }

    pub fn create(&self, spec: &LayerSpec) -> Result<Box<dyn LossLayer<T>>> {
        if spec.dtype != T::DTYPE {
            return Err(LossError::DTypeMismatch {
                name: spec.name.clone(),
                declared: spec.dtype,
                expected: T::DTYPE,
            });
        }
        let creator = self.creators.get(&spec.layer_type).ok_or_else(|| {
            LossError::UnknownLayerType {
                name: spec.layer_type.clone(),
                dtype: T::DTYPE,
            }
        })?;
        debug!(name = %spec.name, layer_type = %spec.layer_type, dtype = %T::DTYPE, "creating layer");
        Ok(creator(spec))
    }

    /// Registered type names, sorted.
    pub fn layer_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.creators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<T: Element> Default for LayerRegistry<T> {
    fn default() -> Self {
        LayerRegistry::with_builtin()
    }
}

fn create_weighted_euclidean<T: Element>(spec: &LayerSpec) -> Box<dyn LossLayer<T>> {
    Box::new(WeightedEuclideanLoss::with_loss_weight(T::from_f64(spec.loss_weight)))
}

fn create_euclidean<T: Element>(spec: &LayerSpec) -> Box<dyn LossLayer<T>> {
    Box::new(EuclideanLoss::with_loss_weight(T::from_f64(spec.loss_weight)))
}
