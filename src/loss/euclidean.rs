use tracing::trace;

use crate::error::{LossError, Result};
use crate::loss::layer::{
    check_propagate_down, matches_validated, reshape_loss_base, LossLayer, Phase,
};
use crate::math::blas;
use crate::math::blob::Blob;
use crate::math::element::Element;

const LAYER: &str = "EuclideanLoss";

/// Plain squared error averaged over the batch: Σ(p − t)² / N / 2.
#[derive(Debug, Clone)]
pub struct EuclideanLoss<T: Element> {
    loss_weight: T,
    shape: Vec<usize>,
    diff: Vec<T>,
    phase: Phase,
}

impl<T: Element> EuclideanLoss<T> {
    pub fn new() -> Self {
        EuclideanLoss::with_loss_weight(T::one())
    }

    pub fn with_loss_weight(loss_weight: T) -> Self {
        EuclideanLoss {
            loss_weight,
            shape: Vec::new(),
            diff: Vec::new(),
            phase: Phase::Unshaped,
        }
    }
}

impl<T: Element> Default for EuclideanLoss<T> {
    fn default() -> Self {
        EuclideanLoss::new()
    }
}

impl<T: Element> LossLayer<T> for EuclideanLoss<T> {
    fn layer_type(&self) -> &'static str {
        LAYER
    }

    fn exact_num_bottom_blobs(&self) -> usize {
        2
    }

    fn loss_weight(&self) -> T {
        self.loss_weight
    }

    fn reshape(&mut self, bottom: &[Blob<T>], top: &mut Blob<T>) -> Result<()> {
        reshape_loss_base(LAYER, self.exact_num_bottom_blobs(), bottom, top)?;
        let (prediction, target) = (&bottom[0], &bottom[1]);
        if prediction.count_from(1) != target.count_from(1) {
            return Err(LossError::ShapeMismatch {
                what: "inputs must share per-example dimension",
                left: prediction.count_from(1),
                right: target.count_from(1),
            });
        }
        self.shape = prediction.shape().to_vec();
        self.diff.resize(prediction.count(), T::zero());
        self.phase = Phase::Reshaped;
        Ok(())
    }

    fn forward(&mut self, bottom: &[Blob<T>], top: &mut Blob<T>) -> Result<T> {
        let [prediction, target] = bottom else {
            return Err(LossError::BottomCount {
                layer: LAYER,
                expected: 2,
                actual: bottom.len(),
            });
        };
        if self.phase == Phase::Unshaped
            || !matches_validated(&self.shape, self.diff.len(), prediction, &[target])
        {
            return Err(LossError::NotReshaped {
                layer: LAYER,
                shape: prediction.shape().to_vec(),
            });
        }

        blas::sub(prediction.data(), target.data(), &mut self.diff);
        let dot = blas::dot(&self.diff, &self.diff);
        let loss = dot / T::from_count(prediction.num()) / T::two();
        top.reshape(&[]);
        top.data_mut()[0] = loss;

        self.phase = Phase::Forwarded;
        trace!(layer = LAYER, loss = loss.as_f64(), "forward");
        Ok(loss)
    }

    fn backward(
        &mut self,
        top: &Blob<T>,
        propagate_down: &[bool],
        bottom: &mut [Blob<T>],
    ) -> Result<()> {
        check_propagate_down(LAYER, propagate_down, 2)?;
        if bottom.len() != 2 {
            return Err(LossError::BottomCount {
                layer: LAYER,
                expected: 2,
                actual: bottom.len(),
            });
        }
        if self.phase != Phase::Forwarded
            || !matches_validated(&self.shape, self.diff.len(), &bottom[0], &[&bottom[1]])
        {
            return Err(LossError::BackwardBeforeForward { layer: LAYER });
        }

        let upstream = top.diff()[0];
        for (i, blob) in bottom.iter_mut().enumerate() {
            if propagate_down[i] {
                let sign = if i == 0 { T::one() } else { -T::one() };
                let alpha = sign * upstream / T::from_count(blob.num());
                blas::axpby(alpha, &self.diff, T::zero(), blob.diff_mut());
            }
        }
        Ok(())
    }
}
