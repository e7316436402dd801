//! Global atomic counters for pipeline observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a run).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, lock-free.
pub struct Metrics {
    assessments_built: AtomicU64,
    sources_unavailable: AtomicU64,
    model_calls: AtomicU64,
    model_failures: AtomicU64,
    responses_repaired: AtomicU64,
    fallbacks_used: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            assessments_built: AtomicU64::new(0),
            sources_unavailable: AtomicU64::new(0),
            model_calls: AtomicU64::new(0),
            model_failures: AtomicU64::new(0),
            responses_repaired: AtomicU64::new(0),
            fallbacks_used: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    fn bump(counter: &AtomicU64, name: &'static str) {
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = name, "counter incremented");
    }

    pub fn inc_assessments(&self) {
        Self::bump(&self.assessments_built, "assessments_built");
    }

    pub fn inc_sources_unavailable(&self) {
        Self::bump(&self.sources_unavailable, "sources_unavailable");
    }

    pub fn inc_model_calls(&self) {
        Self::bump(&self.model_calls, "model_calls");
    }

    pub fn inc_model_failures(&self) {
        Self::bump(&self.model_failures, "model_failures");
    }

    pub fn inc_repaired(&self) {
        Self::bump(&self.responses_repaired, "responses_repaired");
    }

    pub fn inc_fallbacks(&self) {
        Self::bump(&self.fallbacks_used, "fallbacks_used");
    }

    pub fn inc_cache_hits(&self) {
        Self::bump(&self.cache_hits, "cache_hits");
    }

    pub fn inc_cache_misses(&self) {
        Self::bump(&self.cache_misses, "cache_misses");
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a CLI command, monitor tick)
    /// rather than on every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            assessments_built = self.assessments_built(),
            sources_unavailable = self.sources_unavailable(),
            model_calls = self.model_calls(),
            model_failures = self.model_failures(),
            responses_repaired = self.responses_repaired(),
            fallbacks_used = self.fallbacks_used(),
            cache_hits = self.cache_hits(),
            cache_misses = self.cache_misses(),
        );
    }

    pub fn assessments_built(&self) -> u64 {
        self.assessments_built.load(Ordering::Relaxed)
    }

    pub fn sources_unavailable(&self) -> u64 {
        self.sources_unavailable.load(Ordering::Relaxed)
    }

    pub fn model_calls(&self) -> u64 {
        self.model_calls.load(Ordering::Relaxed)
    }

    pub fn model_failures(&self) -> u64 {
        self.model_failures.load(Ordering::Relaxed)
    }

    pub fn responses_repaired(&self) -> u64 {
        self.responses_repaired.load(Ordering::Relaxed)
    }

    pub fn fallbacks_used(&self) -> u64 {
        self.fallbacks_used.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        for counter in [
            &self.assessments_built,
            &self.sources_unavailable,
            &self.model_calls,
            &self.model_failures,
            &self.responses_repaired,
            &self.fallbacks_used,
            &self.cache_hits,
            &self.cache_misses,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        assert_eq!(m.model_calls(), 0);
        m.inc_model_calls();
        m.inc_model_calls();
        assert_eq!(m.model_calls(), 2);

        m.inc_fallbacks();
        assert_eq!(m.fallbacks_used(), 1);

        m.inc_cache_hits();
        m.inc_cache_misses();
        m.inc_cache_misses();
        assert_eq!(m.cache_hits(), 1);
        assert_eq!(m.cache_misses(), 2);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_assessments();
        m.inc_sources_unavailable();
        m.inc_model_failures();
        m.inc_repaired();
        m.reset();
        assert_eq!(m.assessments_built(), 0);
        assert_eq!(m.sources_unavailable(), 0);
        assert_eq!(m.model_failures(), 0);
        assert_eq!(m.responses_repaired(), 0);
    }
}
