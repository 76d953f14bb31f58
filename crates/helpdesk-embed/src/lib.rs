use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Instant;

use candle_core::Device;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use helpdesk_core::config::{EmbeddingSettings, RerankSettings};
use helpdesk_core::traits::{Embedder, PairScorer};

pub mod cross_encoder;
pub mod device;
pub mod pool;
pub mod tokenize;
pub mod weights;

pub use cross_encoder::{CrossEncoder, LexicalScorer};
pub use pool::masked_mean_l2;

/// Dimension of all-MiniLM-L6-v2; the fake embedder matches it so tables
/// built in dev mode keep the production schema.
pub const DEFAULT_DIM: usize = 384;

/// Sentence embedder: BERT encoder, masked mean pooling, L2 normalisation.
pub struct BertEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, model_id: String, dim: usize }

impl BertEmbedder {
    pub fn load(settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        let model_dir = Path::new(&settings.model_dir);
        tracing::info!("Loading embedding model {} from {}", settings.model_id, model_dir.display());
        let tokenizer = tokenize::load_tokenizer(model_dir, settings.max_len)?;
        let config: BertConfig = serde_json::from_str(&weights::read_config_json(model_dir)?)
            .context("Failed to parse BERT config")?;
        let vb = weights::load_var_builder(model_dir, &device)?;
        let model = BertModel::load(vb, &config).context("Failed to initialize BERT model from weights")?;
        tracing::info!("Embedding model loaded (dim={})", config.hidden_size);
        Ok(Self { model, tokenizer, device, model_id: settings.model_id.clone(), dim: config.hidden_size })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let enc = tokenize::tokenize_on_device(&self.tokenizer, text, &self.device)?;
        let hidden = self.model.forward(&enc.input_ids, &enc.type_ids, Some(&enc.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &enc.attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        anyhow::ensure!(emb.len() == self.dim, "expected {} dims, got {}", self.dim, emb.len());
        if start.elapsed().as_millis() > 100 { tracing::debug!("Slow embedding: {:?}", start.elapsed()); }
        Ok(emb)
    }
}

impl Embedder for BertEmbedder {
    fn model_id(&self) -> &str { &self.model_id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

/// Hashes whitespace tokens into buckets; deterministic, L2-normalised.
pub struct FakeEmbedder { dim: usize, model_id: String }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, model_id: format!("fake:xxhash:d{dim}") } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.model_id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// `APP_USE_FAKE_EMBEDDINGS=1` swaps the models for deterministic stand-ins.
pub fn use_fake_models() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if use_fake_models() { tracing::info!("Using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::new(DEFAULT_DIM))); }
    let embedder = BertEmbedder::load(settings)
        .map_err(|e| anyhow!("Failed to load embedding model from {}: {:#}", settings.model_dir, e))?;
    Ok(Box::new(embedder))
}

pub fn get_default_scorer(settings: &RerankSettings) -> Result<Box<dyn PairScorer>> {
    if use_fake_models() { tracing::info!("Using LexicalScorer"); return Ok(Box::new(LexicalScorer::new())); }
    let scorer = CrossEncoder::load(settings)
        .map_err(|e| anyhow!("Failed to load cross-encoder from {}: {:#}", settings.model_dir, e))?;
    Ok(Box::new(scorer))
}
