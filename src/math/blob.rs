use serde::{Deserialize, Serialize};

use crate::error::{LossError, Result};
use crate::math::element::Element;

/// Contiguous row-major tensor paired with a gradient buffer of the same size.
///
/// Axis 0 is the batch axis. `data` holds values flowing forward, `diff`
/// holds gradients flowing backward. Both always have `count()` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob<T> {
    shape: Vec<usize>,
    data: Vec<T>,
    diff: Vec<T>,
}

impl<T: Element> Blob<T> {
    pub fn zeros(shape: &[usize]) -> Blob<T> {
        let count = shape.iter().product();
        Blob {
            shape: shape.to_vec(),
            data: vec![T::zero(); count],
            diff: vec![T::zero(); count],
        }
    }

    /// Wraps existing values. The gradient buffer starts zeroed.
    pub fn from_data(shape: &[usize], data: Vec<T>) -> Result<Blob<T>> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(LossError::ElementCount {
                shape: shape.to_vec(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Blob {
            shape: shape.to_vec(),
            diff: vec![T::zero(); expected],
            data,
        })
    }

    /// Rank-0 blob holding a single value, the shape loss layers produce.
    pub fn scalar(value: T) -> Blob<T> {
        Blob {
            shape: Vec::new(),
            data: vec![value],
            diff: vec![T::zero()],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Batch size: length of axis 0, or 1 for a rank-0 blob.
    pub fn num(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Product of the dimensions from `axis` onwards (1 past the last axis).
    pub fn count_from(&self, axis: usize) -> usize {
        self.shape.iter().skip(axis).product()
    }

    /// Changes the shape, growing or truncating both buffers. Existing values
    /// are kept where they still fit, new slots are zero.
    pub fn reshape(&mut self, shape: &[usize]) {
        let count = shape.iter().product();
        self.shape = shape.to_vec();
        self.data.resize(count, T::zero());
        self.diff.resize(count, T::zero());
    }

    pub fn reshape_like(&mut self, other: &Blob<T>) {
        self.reshape(&other.shape);
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn diff(&self) -> &[T] {
        &self.diff
    }

    pub fn diff_mut(&mut self) -> &mut [T] {
        &mut self.diff
    }
}

impl<T: Element> Default for Blob<T> {
    fn default() -> Self {
        Blob::zeros(&[0])
    }
}
