use tracing::debug;

use crate::error::{LossError, Result};
use crate::math::blob::Blob;
use crate::math::element::Element;

/// A loss layer: consumes a fixed number of bottom blobs and produces one
/// scalar top blob.
///
/// The driver calls `reshape` whenever bottom shapes may have changed, then
/// `forward`, seeds `top.diff[0]` (normally with `loss_weight()`), and
/// finally `backward`. Backward overwrites the `diff` of every bottom whose
/// `propagate_down` flag is set and leaves the others untouched.
pub trait LossLayer<T: Element> {
    fn layer_type(&self) -> &'static str;

    fn exact_num_bottom_blobs(&self) -> usize;

    /// Multiplier a driver applies to this layer's loss in the objective.
    fn loss_weight(&self) -> T;

    fn reshape(&mut self, bottom: &[Blob<T>], top: &mut Blob<T>) -> Result<()>;

    /// Writes the loss into `top.data[0]` and returns it.
    fn forward(&mut self, bottom: &[Blob<T>], top: &mut Blob<T>) -> Result<T>;

    fn backward(
        &mut self,
        top: &Blob<T>,
        propagate_down: &[bool],
        bottom: &mut [Blob<T>],
    ) -> Result<()>;
}

/// Where a layer is in its reshape → forward → backward cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Unshaped,
    Reshaped,
    Forwarded,
}

/// Checks shared by every loss layer: exact bottom count, matching batch
/// size between prediction and target, and a non-empty batch. Reshapes the
/// top blob to a scalar.
pub fn reshape_loss_base<T: Element>(
    layer: &'static str,
    exact_bottoms: usize,
    bottom: &[Blob<T>],
    top: &mut Blob<T>,
) -> Result<()> {
    if bottom.len() != exact_bottoms {
        return Err(LossError::BottomCount {
            layer,
            expected: exact_bottoms,
            actual: bottom.len(),
        });
    }
    let prediction = &bottom[0];
    check_batch(layer, prediction, &bottom[1])?;
    top.reshape(&[]);
    debug!(layer, shape = ?prediction.shape(), "reshaped loss layer");
    Ok(())
}

/// Prediction and target must share a non-empty batch axis.
pub(crate) fn check_batch<T: Element>(
    layer: &'static str,
    prediction: &Blob<T>,
    target: &Blob<T>,
) -> Result<()> {
    if prediction.num() != target.num() {
        return Err(LossError::ShapeMismatch {
            what: "data and label must share batch size",
            left: prediction.num(),
            right: target.num(),
        });
    }
    if prediction.num() == 0 {
        return Err(LossError::EmptyBatch { layer });
    }
    Ok(())
}

/// True when `prediction` still has the validated shape and every other
/// input holds the validated number of elements.
pub(crate) fn matches_validated<T: Element>(
    shape: &[usize],
    count: usize,
    prediction: &Blob<T>,
    others: &[&Blob<T>],
) -> bool {
    prediction.shape() == shape && others.iter().all(|blob| blob.count() == count)
}

pub(crate) fn check_propagate_down(
    layer: &'static str,
    propagate_down: &[bool],
    bottoms: usize,
) -> Result<()> {
    if propagate_down.len() != bottoms {
        return Err(LossError::PropagateDownCount {
            layer,
            expected: bottoms,
            actual: propagate_down.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_rejects_wrong_bottom_count() {
        let bottom = vec![Blob::<f32>::zeros(&[2, 3]); 2];
        let mut top = Blob::scalar(0.0);
        let err = reshape_loss_base("Test", 3, &bottom, &mut top).unwrap_err();
        assert!(matches!(err, LossError::BottomCount { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn base_rejects_batch_mismatch_between_data_and_label() {
        let bottom = vec![Blob::<f32>::zeros(&[2, 3]), Blob::zeros(&[4, 3])];
        let mut top = Blob::scalar(0.0);
        let err = reshape_loss_base("Test", 2, &bottom, &mut top).unwrap_err();
        assert!(matches!(err, LossError::ShapeMismatch { left: 2, right: 4, .. }));
    }

    #[test]
    fn base_rejects_empty_batch() {
        let bottom = vec![Blob::<f64>::zeros(&[0, 3]); 2];
        let mut top = Blob::scalar(0.0);
        let err = reshape_loss_base("Test", 2, &bottom, &mut top).unwrap_err();
        assert!(matches!(err, LossError::EmptyBatch { layer: "Test" }));
    }

    #[test]
    fn base_turns_top_into_a_scalar() {
        let bottom = vec![Blob::<f64>::zeros(&[2, 3]); 2];
        let mut top = Blob::zeros(&[5, 5]);
        reshape_loss_base("Test", 2, &bottom, &mut top).unwrap();
        assert!(top.shape().is_empty());
        assert_eq!(top.count(), 1);
    }
}
