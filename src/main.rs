// Runs one forward/backward cycle of a loss layer on random data.
//
//   cargo run -- [layer_spec.json]
//
// Without a spec file a weighted Euclidean f32 layer is used.
use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ferrite_loss::{Blob, DType, Element, Filler, LayerRegistry, LayerSpec};

const BATCH: usize = 4;
const INNER: [usize; 2] = [2, 3];

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let spec = match std::env::args().nth(1) {
        Some(path) => LayerSpec::load_json(&path)?,
        None => LayerSpec::new("loss", "WeightedEuclideanLoss"),
    };
    info!(name = %spec.name, layer_type = %spec.layer_type, dtype = %spec.dtype, "loaded layer spec");

    match spec.dtype {
        DType::F32 => run::<f32>(&spec),
        DType::F64 => run::<f64>(&spec),
    }
}

fn run<T: Element>(spec: &LayerSpec) -> Result<()> {
    let registry = LayerRegistry::<T>::with_builtin();
    let mut layer = registry.create(spec)?;

    let shape = [BATCH, INNER[0], INNER[1]];
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut bottom: Vec<Blob<T>> = (0..layer.exact_num_bottom_blobs())
        .map(|_| Blob::zeros(&shape))
        .collect();
    Filler::Gaussian { mean: 0.0, std: 1.0 }.fill_with(&mut rng, bottom[0].data_mut());
    Filler::Gaussian { mean: 0.0, std: 1.0 }.fill_with(&mut rng, bottom[1].data_mut());
    if let Some(weight) = bottom.get_mut(2) {
        Filler::Uniform { min: 0.0, max: 1.0 }.fill_with(&mut rng, weight.data_mut());
    }

    let mut top = Blob::scalar(T::zero());
    layer.reshape(&bottom, &mut top)?;
    let loss = layer.forward(&bottom, &mut top)?;
    info!(layer = layer.layer_type(), loss = loss.as_f64(), "forward");

    top.diff_mut()[0] = layer.loss_weight();
    let propagate_down = vec![true; bottom.len()];
    layer.backward(&top, &propagate_down, &mut bottom)?;

    for (i, blob) in bottom.iter().enumerate() {
        let norm = blob.diff().iter().map(|g| g.as_f64().powi(2)).sum::<f64>().sqrt();
        info!(bottom = i, grad_norm = norm, "backward");
    }
    Ok(())
}
