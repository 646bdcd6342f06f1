use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::element::DType;

fn default_loss_weight() -> f64 {
    1.0
}

/// Serializable description of one loss layer.
///
/// Fields:
/// - `name`        — instance name, used in logs and error messages
/// - `type`        — registered layer type, e.g. `"WeightedEuclideanLoss"`
/// - `dtype`       — element type the layer is built for (default `f32`)
/// - `loss_weight` — multiplier on the layer's loss in the objective (default 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default)]
    pub dtype: DType,
    #[serde(default = "default_loss_weight")]
    pub loss_weight: f64,
}

impl LayerSpec {
    pub fn new(name: &str, layer_type: &str) -> LayerSpec {
        LayerSpec {
            name: name.to_string(),
            layer_type: layer_type.to_string(),
            dtype: DType::default(),
            loss_weight: default_loss_weight(),
        }
    }

    pub fn with_dtype(mut self, dtype: DType) -> LayerSpec {
        self.dtype = dtype;
        self
    }

    pub fn with_loss_weight(mut self, loss_weight: f64) -> LayerSpec {
        self.loss_weight = loss_weight;
        self
    }

    pub fn from_json_str(json: &str) -> Result<LayerSpec> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `LayerSpec` from a JSON file written by `save_json`.
    pub fn load_json(path: &str) -> Result<LayerSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let spec = LayerSpec::from_json_str(r#"{"name":"loss","type":"EuclideanLoss"}"#).unwrap();
        assert_eq!(spec, LayerSpec::new("loss", "EuclideanLoss"));
        assert_eq!(spec.dtype, DType::F32);
        assert_eq!(spec.loss_weight, 1.0);
    }

    #[test]
    fn type_field_is_renamed_in_json() {
        let spec = LayerSpec::new("wl", "WeightedEuclideanLoss")
            .with_dtype(DType::F64)
            .with_loss_weight(0.5);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains(r#""type":"WeightedEuclideanLoss""#));
        assert!(json.contains(r#""dtype":"f64""#));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = LayerSpec::from_json_str("{\"name\": 3}").unwrap_err();
        assert!(matches!(err, crate::error::LossError::Json(_)));
    }
}
