//! Per-run metrics assembled after a generation attempt finishes.

use crate::pipeline::classify::ErrorRecord;
use crate::pipeline::monitor::{MemoryUsageSummary, StageTiming};
use facture_cache::CacheStats;
use std::time::Duration;

/// Everything measured during a single generation run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Wall-clock time for the whole run.
    pub render_time: Duration,
    pub memory: MemoryUsageSummary,
    pub pdf_size_bytes: usize,
    pub page_count: usize,
    pub cache_hit: bool,
    pub cache: CacheStats,
    pub stages: Vec<StageTiming>,
    /// Non-fatal problems surfaced alongside the output.
    pub warnings: Vec<String>,
    /// Classified records for the degradations behind `warnings`.
    pub errors: Vec<ErrorRecord>,
}

impl RunReport {
    pub fn render_time_ms(&self) -> u128 {
        self.render_time.as_millis()
    }

    /// Stages that ran past the configured duration budget.
    pub fn slow_stages(&self) -> impl Iterator<Item = &StageTiming> {
        self.stages.iter().filter(|stage| stage.over_budget)
    }
}
