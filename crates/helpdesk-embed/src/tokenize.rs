use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use std::path::Path;
use tokenizers::{EncodeInput, Tokenizer, TruncationParams, TruncationStrategy};

/// Model inputs for a single sequence or sequence pair, batch size 1.
pub struct EncodedInput {
    pub input_ids: Tensor,
    pub type_ids: Tensor,
    pub attention_mask: Tensor,
}

/// Load `tokenizer.json` from `model_dir`, truncating to `max_len` tokens.
/// Pairs are truncated longest-first so both [SEP] markers survive.
pub fn load_tokenizer(model_dir: &Path, max_len: usize) -> Result<Tokenizer> {
    let path = model_dir.join("tokenizer.json");
    let mut tokenizer = Tokenizer::from_file(&path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            strategy: TruncationStrategy::LongestFirst,
            ..Default::default()
        }))
        .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    Ok(tokenizer)
}

pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, device: &Device) -> Result<EncodedInput> {
    encode(tokenizer, text.into(), device)
}

pub fn tokenize_pair_on_device(tokenizer: &Tokenizer, first: &str, second: &str, device: &Device) -> Result<EncodedInput> {
    encode(tokenizer, (first, second).into(), device)
}

fn encode(tokenizer: &Tokenizer, input: EncodeInput<'_>, device: &Device) -> Result<EncodedInput> {
    let enc = tokenizer.encode(input, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let len = enc.get_ids().len();
    if len == 0 { return Err(anyhow!("Tokenization produced no tokens")); }
    let input_ids = Tensor::from_iter(enc.get_ids().iter().copied(), device)?.reshape((1, len))?;
    let type_ids = Tensor::from_iter(enc.get_type_ids().iter().copied(), device)?.reshape((1, len))?;
    let attention_mask = Tensor::from_iter(enc.get_attention_mask().iter().copied(), device)?.reshape((1, len))?;
    Ok(EncodedInput { input_ids, type_ids, attention_mask })
}
