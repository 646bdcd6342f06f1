use tracing::trace;

use crate::error::{LossError, Result};
use crate::loss::layer::{
    check_batch, check_propagate_down, matches_validated, reshape_loss_base, LossLayer, Phase,
};
use crate::math::blas;
use crate::math::blob::Blob;
use crate::math::element::Element;

const LAYER: &str = "WeightedEuclideanLoss";

/// Which inputs a backward pass should produce gradients for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GradientRequest {
    pub prediction: bool,
    pub target: bool,
    pub weight: bool,
}

impl GradientRequest {
    pub fn all() -> Self {
        GradientRequest { prediction: true, target: true, weight: true }
    }

    pub fn none() -> Self {
        GradientRequest::default()
    }

    /// Reads `[prediction, target, weight]` flags.
    pub fn from_flags(flags: [bool; 3]) -> Self {
        let [prediction, target, weight] = flags;
        GradientRequest { prediction, target, weight }
    }
}

/// Weighted squared error averaged over the batch:
///
///   loss = Σ w·(p − t)² / N / 2
///
/// `p`, `t`, `w` share the shape (N, …). Gradients:
///
///   ∂loss/∂p =  w·(p − t) / N
///   ∂loss/∂t = −w·(p − t) / N
///   ∂loss/∂w =  (p − t)² / N / 2
///
/// The scratch buffers are reused between calls; one instance must not be
/// driven from two places at once.
#[derive(Debug, Clone)]
pub struct WeightedEuclideanLoss<T: Element> {
    loss_weight: T,
    shape: Vec<usize>,
    diff: Vec<T>,
    weighted_diff: Vec<T>,
    diff_squared: Vec<T>,
    phase: Phase,
}

impl<T: Element> WeightedEuclideanLoss<T> {
    pub fn new() -> Self {
        WeightedEuclideanLoss::with_loss_weight(T::one())
    }

    pub fn with_loss_weight(loss_weight: T) -> Self {
        WeightedEuclideanLoss {
            loss_weight,
            shape: Vec::new(),
            diff: Vec::new(),
            weighted_diff: Vec::new(),
            diff_squared: Vec::new(),
            phase: Phase::Unshaped,
        }
    }

    /// Checks that `target` and `weight` line up with `prediction` and sizes
    /// the scratch buffers to match. Call again whenever shapes change.
    pub fn validate_shapes(
        &mut self,
        prediction: &Blob<T>,
        target: &Blob<T>,
        weight: &Blob<T>,
    ) -> Result<()> {
        check_batch(LAYER, prediction, target)?;
        if prediction.num() != weight.num() {
            return Err(LossError::ShapeMismatch {
                what: "data and weight must share batch size",
                left: prediction.num(),
                right: weight.num(),
            });
        }
        let inner = prediction.count_from(1);
        if inner != target.count_from(1) {
            return Err(LossError::ShapeMismatch {
                what: "inputs must share per-example dimension",
                left: inner,
                right: target.count_from(1),
            });
        }
        if inner != weight.count_from(1) {
            return Err(LossError::ShapeMismatch {
                what: "inputs must share per-example dimension",
                left: inner,
                right: weight.count_from(1),
            });
        }

        let count = prediction.count();
        self.shape = prediction.shape().to_vec();
        self.diff.resize(count, T::zero());
        self.weighted_diff.resize(count, T::zero());
        self.diff_squared.resize(count, T::zero());
        self.phase = Phase::Reshaped;
        Ok(())
    }

    /// Returns `Σ w·(p − t)² / N / 2` and keeps `p − t` and `w·(p − t)` for
    /// the following backward pass.
    pub fn compute_forward(
        &mut self,
        prediction: &Blob<T>,
        target: &Blob<T>,
        weight: &Blob<T>,
    ) -> Result<T> {
        if self.phase == Phase::Unshaped
            || !matches_validated(&self.shape, self.diff.len(), prediction, &[target, weight])
        {
            return Err(LossError::NotReshaped {
                layer: LAYER,
                shape: prediction.shape().to_vec(),
            });
        }

        blas::sub(prediction.data(), target.data(), &mut self.diff);
        blas::mul(weight.data(), &self.diff, &mut self.weighted_diff);
        let dot = blas::dot(&self.weighted_diff, &self.diff);
        let loss = dot / T::from_count(prediction.num()) / T::two();

        self.phase = Phase::Forwarded;
        trace!(layer = LAYER, loss = loss.as_f64(), "forward");
        Ok(loss)
    }

    /// Overwrites the `diff` of each requested input with its gradient,
    /// scaled by the upstream gradient `upstream`.
    pub fn compute_backward(
        &mut self,
        upstream: T,
        request: GradientRequest,
        prediction: &mut Blob<T>,
        target: &mut Blob<T>,
        weight: &mut Blob<T>,
    ) -> Result<()> {
        if self.phase != Phase::Forwarded
            || !matches_validated(&self.shape, self.diff.len(), prediction, &[&*target, &*weight])
        {
            return Err(LossError::BackwardBeforeForward { layer: LAYER });
        }
        trace!(
            layer = LAYER,
            prediction = request.prediction,
            target = request.target,
            weight = request.weight,
            "backward"
        );

        for (sign, blob, requested) in [
            (T::one(), prediction, request.prediction),
            (-T::one(), target, request.target),
        ] {
            if requested {
                let alpha = sign * upstream / T::from_count(blob.num());
                blas::axpby(alpha, &self.weighted_diff, T::zero(), blob.diff_mut());
            }
        }

        if request.weight {
            blas::mul(&self.diff, &self.diff, &mut self.diff_squared);
            let alpha = upstream / T::from_count(weight.num()) / T::two();
            blas::axpby(alpha, &self.diff_squared, T::zero(), weight.diff_mut());
        }
        Ok(())
    }
}

impl<T: Element> Default for WeightedEuclideanLoss<T> {
    fn default() -> Self {
        WeightedEuclideanLoss::new()
    }
}

impl<T: Element> LossLayer<T> for WeightedEuclideanLoss<T> {
    fn layer_type(&self) -> &'static str {
        LAYER
    }

    fn exact_num_bottom_blobs(&self) -> usize {
        3
    }

    fn loss_weight(&self) -> T {
        self.loss_weight
    }

    fn reshape(&mut self, bottom: &[Blob<T>], top: &mut Blob<T>) -> Result<()> {
        reshape_loss_base(LAYER, self.exact_num_bottom_blobs(), bottom, top)?;
        self.validate_shapes(&bottom[0], &bottom[1], &bottom[2])
    }

    fn forward(&mut self, bottom: &[Blob<T>], top: &mut Blob<T>) -> Result<T> {
        let [prediction, target, weight] = bottom else {
            return Err(LossError::BottomCount {
                layer: LAYER,
                expected: 3,
                actual: bottom.len(),
            });
        };
        let loss = self.compute_forward(prediction, target, weight)?;
        top.reshape(&[]);
        top.data_mut()[0] = loss;
        Ok(loss)
    }

    fn backward(
        &mut self,
        top: &Blob<T>,
        propagate_down: &[bool],
        bottom: &mut [Blob<T>],
    ) -> Result<()> {
        check_propagate_down(LAYER, propagate_down, 3)?;
        let actual = bottom.len();
        let [prediction, target, weight] = bottom else {
            return Err(LossError::BottomCount { layer: LAYER, expected: 3, actual });
        };
        let request = GradientRequest::from_flags([
            propagate_down[0],
            propagate_down[1],
            propagate_down[2],
        ]);
        self.compute_backward(top.diff()[0], request, prediction, target, weight)
    }
}
