use std::fmt::{self, Debug, Display};

use num::Float;
use serde::{Deserialize, Serialize};

/// Runtime tag for the element type a layer is built for.
///
/// Stored in layer specs so the registry can refuse to build an `f64` layer
/// out of a spec that asked for `f32` (and vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    #[default]
    F32,
    F64,
}

impl Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
        }
    }
}

/// Numeric element a blob can hold. The loss math is written once against
/// this trait and instantiated for both float widths.
pub trait Element: Float + Default + Debug + Display + Send + Sync + 'static {
    const DTYPE: DType;

    fn from_f64(value: f64) -> Self;

    /// Converts an element count (batch size etc.) into the element type.
    fn from_count(count: usize) -> Self;

    fn as_f64(self) -> f64;

    fn two() -> Self {
        Self::one() + Self::one()
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn from_count(count: usize) -> Self {
        count as f32
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn from_count(count: usize) -> Self {
        count as f64
    }

    fn as_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtype_tags_follow_the_float_width() {
        assert_eq!(<f32 as Element>::DTYPE, DType::F32);
        assert_eq!(<f64 as Element>::DTYPE, DType::F64);
        assert_eq!(DType::default(), DType::F32);
    }

    #[test]
    fn dtype_serializes_as_lowercase_name() {
        assert_eq!(serde_json::to_string(&DType::F64).unwrap(), "\"f64\"");
        let parsed: DType = serde_json::from_str("\"f32\"").unwrap();
        assert_eq!(parsed, DType::F32);
        assert_eq!(DType::F64.to_string(), "f64");
    }
}
