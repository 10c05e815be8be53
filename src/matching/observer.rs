//! Diagnostics hooks for the edge matcher.

use tracing::{debug, info, warn};

use crate::matching::types::MatchSummary;

/// Receives matching diagnostics. Observers only report; they never change
/// what is written onto the graph.
pub trait MatchObserver {
    /// An edge name was matched approximately.
    fn on_fuzzy_match(&mut self, _candidate: &str, _matched: &str, _score: f64) {}

    /// An edge with a name matched nothing.
    fn on_unmatched(&mut self, _raw: &str, _canonical: &str) {}

    fn on_complete(&mut self, _summary: &MatchSummary) {}
}

/// Silent observer.
impl MatchObserver for () {}

/// Logs diagnostics through `tracing`, reporting at most `unmatched_limit`
/// unmatched names individually.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    unmatched_limit: usize,
    unmatched_seen: usize,
}

impl TracingObserver {
    pub const DEFAULT_UNMATCHED_LIMIT: usize = 20;

    pub fn new(unmatched_limit: usize) -> Self {
        Self {
            unmatched_limit,
            unmatched_seen: 0,
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_UNMATCHED_LIMIT)
    }
}

impl MatchObserver for TracingObserver {
    fn on_fuzzy_match(&mut self, candidate: &str, matched: &str, score: f64) {
        debug!(candidate, matched, score, "Fuzzy road name match");
    }

    fn on_unmatched(&mut self, raw: &str, canonical: &str) {
        self.unmatched_seen += 1;
        if self.unmatched_seen <= self.unmatched_limit {
            warn!(road = raw, normalized = canonical, "Unmatched OSM road");
        }
    }

    fn on_complete(&mut self, summary: &MatchSummary) {
        info!(
            with_data = summary.edges_with_data,
            total = summary.total_edges,
            exact = summary.exact,
            fuzzy = summary.fuzzy,
            unmatched = summary.unmatched,
            "Traffic mapping complete"
        );
    }
}

/// Counts callbacks. Used by tests and callers that want the raw numbers.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub fuzzy: Vec<(String, String, f64)>,
    pub unmatched: Vec<(String, String)>,
    pub summary: Option<MatchSummary>,
}

impl MatchObserver for RecordingObserver {
    fn on_fuzzy_match(&mut self, candidate: &str, matched: &str, score: f64) {
        self.fuzzy
            .push((candidate.to_string(), matched.to_string(), score));
    }

    fn on_unmatched(&mut self, raw: &str, canonical: &str) {
        self.unmatched.push((raw.to_string(), canonical.to_string()));
    }

    fn on_complete(&mut self, summary: &MatchSummary) {
        self.summary = Some(*summary);
    }
}
