use thiserror::Error;

use crate::math::element::DType;

pub type Result<T> = std::result::Result<T, LossError>;

/// Everything that can go wrong while configuring or driving a loss layer.
///
/// Shape and count errors are configuration errors: they mean the layer was
/// wired to blobs that cannot work together, and the caller should abort
/// building rather than retry.
#[derive(Debug, Error)]
pub enum LossError {
    #[error("shape mismatch: {what} ({left} vs {right})")]
    ShapeMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    #[error("{layer} takes exactly {expected} bottom blobs, got {actual}")]
    BottomCount {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{layer} needs one propagate_down flag per bottom ({expected}), got {actual}")]
    PropagateDownCount {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{layer} cannot normalize over an empty batch")]
    EmptyBatch { layer: &'static str },

    #[error("shape {shape:?} holds {expected} elements, {actual} supplied")]
    ElementCount {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("{layer}: forward on shape {shape:?} without a matching reshape")]
    NotReshaped {
        layer: &'static str,
        shape: Vec<usize>,
    },

    #[error("{layer}: backward without a forward pass on the current shapes")]
    BackwardBeforeForward { layer: &'static str },

    #[error("unknown layer type {name:?} for element type {dtype}")]
    UnknownLayerType { name: String, dtype: DType },

    #[error("layer type {0:?} is already registered")]
    DuplicateLayerType(String),

    #[error("layer {name:?} is declared as {declared} but the registry builds {expected}")]
    DTypeMismatch {
        name: String,
        declared: DType,
        expected: DType,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
