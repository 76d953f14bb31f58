//! Pairwise relevance scoring.
//!
//! `CrossEncoder` runs a BERT sequence-classification checkpoint
//! (e.g. `cross-encoder/ms-marco-MiniLM-L-6-v2`) over `[CLS] q [SEP] p [SEP]`
//! and returns the raw relevance logit. `LexicalScorer` is the model-free
//! stand-in used in dev and tests.

use anyhow::{Context, Result};
use candle_core::{Device, Module};
use candle_nn::Linear;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tokenizers::Tokenizer;

use helpdesk_core::config::RerankSettings;
use helpdesk_core::traits::PairScorer;

use crate::{device, tokenize, weights};

pub struct CrossEncoder {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
}

impl CrossEncoder {
    pub fn load(settings: &RerankSettings) -> Result<Self> {
        let device = device::select_device();
        let model_dir = Path::new(&settings.model_dir);
        tracing::info!("Loading cross-encoder {} from {}", settings.model_id, model_dir.display());
        let tokenizer = tokenize::load_tokenizer(model_dir, settings.max_len)?;
        let raw_config = weights::read_config_json(model_dir)?;
        let config: BertConfig = serde_json::from_str(&raw_config).context("Failed to parse BERT config")?;
        let num_labels = num_labels(&raw_config);

        let vb = weights::load_var_builder(model_dir, &device)?;
        let bert = BertModel::load(vb.pp("bert"), &config).context("Failed to load BERT encoder")?;
        let pooler = candle_nn::linear(config.hidden_size, config.hidden_size, vb.pp("bert").pp("pooler").pp("dense"))
            .context("Failed to load pooler")?;
        let classifier = candle_nn::linear(config.hidden_size, num_labels, vb.pp("classifier"))
            .context("Failed to load classification head")?;
        tracing::info!("Cross-encoder loaded ({} label(s))", num_labels);
        Ok(Self { bert, pooler, classifier, tokenizer, device, model_id: settings.model_id.clone() })
    }

    fn score_one(&self, question: &str, passage: &str) -> Result<f32> {
        let enc = tokenize::tokenize_pair_on_device(&self.tokenizer, question, passage, &self.device)?;
        let hidden = self.bert.forward(&enc.input_ids, &enc.type_ids, Some(&enc.attention_mask))?;
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?.to_device(&Device::Cpu)?.flatten_all()?.to_vec1::<f32>()?;
        // Single-logit heads score relevance directly; two-label heads put "relevant" last.
        logits.last().copied().context("classifier produced no logits")
    }
}

impl PairScorer for CrossEncoder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn score_pairs(&self, question: &str, passages: &[&str]) -> Result<Vec<f32>> {
        passages.iter().map(|p| self.score_one(question, p)).collect()
    }
}

fn num_labels(raw_config: &str) -> usize {
    serde_json::from_str::<Value>(raw_config)
        .ok()
        .and_then(|v| v.get("id2label").and_then(Value::as_object).map(|m| m.len()))
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Fraction of distinct question terms present in the passage.
#[derive(Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    pub fn new() -> Self {
        Self
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl PairScorer for LexicalScorer {
    fn model_id(&self) -> &str {
        "lexical-overlap"
    }

    fn score_pairs(&self, question: &str, passages: &[&str]) -> Result<Vec<f32>> {
        let q = terms(question);
        Ok(passages
            .iter()
            .map(|p| {
                if q.is_empty() {
                    return 0.0;
                }
                let p = terms(p);
                q.iter().filter(|t| p.contains(*t)).count() as f32 / q.len() as f32
            })
            .collect())
    }
}
