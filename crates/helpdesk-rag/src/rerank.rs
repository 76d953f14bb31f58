//! Ranking strategies over the concatenated candidate list.
//!
//! The strategy is picked once from `RerankSettings`:
//! - `CrossEncoderRanker` scores every (question, passage) pair and keeps the
//!   best `top_n`, ties resolved by input order
//! - `PassthroughRanker` keeps the concatenated order and applies a cap

use std::cmp::Ordering;
use std::sync::Arc;

use helpdesk_core::config::RerankSettings;
use helpdesk_core::traits::PairScorer;
use helpdesk_core::types::{Candidate, RankedCandidate};

pub trait Ranker: Send + Sync {
    fn name(&self) -> &str;
    fn rank(&self, question: &str, candidates: Vec<Candidate>) -> anyhow::Result<Vec<RankedCandidate>>;
}

pub struct CrossEncoderRanker {
    scorer: Arc<dyn PairScorer>,
    top_n: usize,
}

impl CrossEncoderRanker {
    pub fn new(scorer: Arc<dyn PairScorer>, top_n: usize) -> Self {
        Self { scorer, top_n }
    }
}

fn by_score_desc(a: f32, b: f32) -> Ordering {
    let key = |x: f32| if x.is_nan() { f32::NEG_INFINITY } else { x };
    key(b).total_cmp(&key(a))
}

impl Ranker for CrossEncoderRanker {
    fn name(&self) -> &str {
        "cross-encoder"
    }

    fn rank(&self, question: &str, candidates: Vec<Candidate>) -> anyhow::Result<Vec<RankedCandidate>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let passages: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        let scores = self.scorer.score_pairs(question, &passages)?;
        anyhow::ensure!(
            scores.len() == candidates.len(),
            "scorer {} returned {} scores for {} passages",
            self.scorer.model_id(),
            scores.len(),
            candidates.len()
        );
        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, rank_score)| RankedCandidate { candidate, rank_score })
            .collect();
        // sort_by is stable: equal scores keep input order.
        ranked.sort_by(|a, b| by_score_desc(a.rank_score, b.rank_score));
        ranked.truncate(self.top_n);
        tracing::info!("Re-ranked documents (top {}): {}", self.top_n, ranked.len());
        Ok(ranked)
    }
}

/// Re-ranking disabled: concatenated order, capped.
pub struct PassthroughRanker {
    cap: usize,
}

impl PassthroughRanker {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }
}

impl Ranker for PassthroughRanker {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn rank(&self, _question: &str, candidates: Vec<Candidate>) -> anyhow::Result<Vec<RankedCandidate>> {
        Ok(candidates
            .into_iter()
            .take(self.cap)
            .map(|candidate| RankedCandidate { rank_score: candidate.score, candidate })
            .collect())
    }
}

/// `scorer` is only invoked when re-ranking is enabled.
pub fn build_ranker<F>(settings: &RerankSettings, scorer: F) -> anyhow::Result<Box<dyn Ranker>>
where
    F: FnOnce() -> anyhow::Result<Arc<dyn PairScorer>>,
{
    if settings.enabled {
        Ok(Box::new(CrossEncoderRanker::new(scorer()?, settings.top_n)))
    } else {
        tracing::info!("Re-ranking disabled; passing through up to {} candidates", settings.passthrough_cap);
        Ok(Box::new(PassthroughRanker::new(settings.passthrough_cap)))
    }
}
