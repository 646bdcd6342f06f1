use std::f64::consts::PI;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::math::blob::Blob;
use crate::math::element::Element;

/// How to populate a blob's values before a run.
///
/// - `Constant` — every element set to `value`.
/// - `Uniform`  — samples from U(min, max).
/// - `Gaussian` — samples from N(mean, std²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filler {
    Constant { value: f64 },
    Uniform { min: f64, max: f64 },
    Gaussian { mean: f64, std: f64 },
}

impl Filler {
    /// Fills `blob.data` using the thread-local RNG.
    pub fn fill<T: Element>(&self, blob: &mut Blob<T>) {
        self.fill_with(&mut rand::thread_rng(), blob.data_mut());
    }

    /// Fills `out` from a caller-supplied RNG (seed it for reproducible runs).
    pub fn fill_with<T: Element, R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [T]) {
        for slot in out.iter_mut() {
            let value = match *self {
                Filler::Constant { value } => value,
                Filler::Uniform { min, max } => min + rng.gen::<f64>() * (max - min),
                Filler::Gaussian { mean, std } => mean + std * sample_standard_normal(rng),
            };
            *slot = T::from_f64(value);
        }
    }
}

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Both uniforms live in (0, 1] so ln() never sees zero.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn constant_fills_every_element() {
        let mut blob: Blob<f32> = Blob::zeros(&[2, 3]);
        Filler::Constant { value: 0.25 }.fill(&mut blob);
        assert!(blob.data().iter().all(|&x| x == 0.25));
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = vec![0.0f64; 500];
        Filler::Uniform { min: -2.0, max: 3.0 }.fill_with(&mut rng, &mut out);
        assert!(out.iter().all(|&x| (-2.0..=3.0).contains(&x)));
    }

    #[test]
    fn seeded_gaussian_is_reproducible_and_finite() {
        let filler = Filler::Gaussian { mean: 1.0, std: 0.5 };
        let mut a = vec![0.0f64; 64];
        let mut b = vec![0.0f64; 64];
        filler.fill_with(&mut StdRng::seed_from_u64(42), &mut a);
        filler.fill_with(&mut StdRng::seed_from_u64(42), &mut b);
        assert_eq!(a, b);
        assert!(a.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn filler_json_is_tagged() {
        let filler: Filler = serde_json::from_str(r#"{"type":"uniform","min":0.0,"max":1.0}"#).unwrap();
        assert_eq!(filler, Filler::Uniform { min: 0.0, max: 1.0 });
    }
}
