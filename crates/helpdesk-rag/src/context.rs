use helpdesk_core::types::RankedCandidate;

pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Provenance shown for a passage; empty sources render as `N/A`.
pub fn provenance(candidate: &RankedCandidate) -> &str {
    let source = candidate.candidate.source().trim();
    if source.is_empty() { "N/A" } else { source }
}

/// Renders ranked passages, best first, as `Source:`/`Content:` blocks.
/// Passage text is never truncated here.
pub fn assemble_context(ranked: &[RankedCandidate]) -> String {
    ranked
        .iter()
        .map(|c| format!("Source: {}\nContent: {}", provenance(c), c.candidate.text))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Debug view of what will be sent to the model.
pub fn log_context(ranked: &[RankedCandidate]) {
    for (i, c) in ranked.iter().enumerate() {
        let preview: String = c.candidate.text.chars().take(500).collect();
        tracing::debug!(rank = i + 1, score = c.rank_score, index = %c.candidate.index, "Source: {}\nContent: {}...", provenance(c), preview);
    }
}
