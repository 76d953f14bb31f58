use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use std::collections::HashMap;
use std::path::Path;

/// Weights from `model.safetensors`, falling back to `pytorch_model.bin`.
pub fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        tracing::debug!("Loading weights from {}", safetensors.display());
        // SAFETY: the file is memory-mapped read-only and not modified while loaded.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[&safetensors], DType::F32, device) }
            .with_context(|| format!("Failed to map {}", safetensors.display()))?;
        return Ok(vb);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        tracing::debug!("Loading weights from {}", pickle.display());
        let weights = candle_core::pickle::read_all(&pickle)?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights_map, DType::F32, device));
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

pub fn read_config_json(model_dir: &Path) -> Result<String> {
    let path = model_dir.join("config.json");
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}
