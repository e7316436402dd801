//! End-to-end crisis monitoring for a region.
//!
//! [`CrisisMonitor`] fans out the four source fetches concurrently, builds
//! the assessment, runs the AI chain and costs a response plan. Source
//! failures of any kind (error, timeout, panic) degrade only their own
//! domain; caller input errors are the only failures that surface.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::aggregator::build_assessment;
use crate::ai::{AiOrchestrator, ModelTransport};
use crate::artifact::RunReport;
use crate::cache::{CacheStats, TtlCache};
use crate::config::PipelineConfig;
use crate::domain::{
    AiAnalysis, CanonicalSourceRecord, CrisisAssessment, Domain, Region, ResponsePlan, Result,
    SourceSet,
};
use crate::metrics::METRICS;
use crate::normalize::normalize;
use crate::obs;
use crate::plan::{PlanEngine, PlanRequest};
use crate::sources::SourceFetcher;

/// Owns the injected fetcher and transport plus the region caches.
pub struct CrisisMonitor {
    config: PipelineConfig,
    fetcher: Arc<dyn SourceFetcher>,
    orchestrator: AiOrchestrator,
    engine: PlanEngine,
    assessments: TtlCache<CrisisAssessment>,
    analyses: TtlCache<AiAnalysis>,
}

impl CrisisMonitor {
    /// Validates `config` and wires the pipeline.
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn SourceFetcher>,
        transport: Arc<dyn ModelTransport>,
    ) -> Result<Self> {
        config.validate()?;
        let engine = PlanEngine::new(config.plan, config.funding)?;
        Ok(Self {
            orchestrator: AiOrchestrator::new(config.ai.clone(), transport),
            engine,
            assessments: TtlCache::new(Duration::from_secs(config.cache.assessment_ttl_secs)),
            analyses: TtlCache::new(Duration::from_secs(config.cache.analysis_ttl_secs)),
            fetcher,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Assess `region` (ISO alpha-3), serving from cache within the TTL.
    pub async fn assess(&self, region: &str) -> Result<CrisisAssessment> {
        let region = Region::parse(region)?;
        if let Some(cached) = self.assessments.get(region.code()).await {
            debug!(region = %region, "assessment served from cache");
            return Ok(cached);
        }

        let span = obs::assessment_span(region.code());
        let assessment = async {
            let sources = self.fetch_sources(&region).await;
            let assessment = build_assessment(region.clone(), sources, &self.config.displacement);
            METRICS.inc_assessments();
            obs::emit_assessment_completed(
                region.code(),
                &assessment.overall_risk.to_string(),
                assessment.risk_score,
                assessment.available_sources(),
            );
            assessment
        }
        .instrument(span)
        .await;

        self.assessments
            .insert(region.code(), assessment.clone())
            .await;
        Ok(assessment)
    }

    /// Fetch and normalize all four sources concurrently.
    ///
    /// A domain whose task errors, times out or panics keeps an
    /// unavailable record.
    pub async fn fetch_sources(&self, region: &Region) -> SourceSet {
        let timeout = Duration::from_millis(self.config.source_timeout_ms);
        let mut join_set = JoinSet::new();
        for domain in Domain::ALL {
            let fetcher = Arc::clone(&self.fetcher);
            let region = region.clone();
            join_set.spawn(async move {
                match tokio::time::timeout(timeout, fetcher.fetch(domain, &region)).await {
                    Ok(Ok(payload)) => normalize(domain, &payload),
                    Ok(Err(e)) => CanonicalSourceRecord::unavailable(domain, e.to_string()),
                    Err(_elapsed) => CanonicalSourceRecord::unavailable(
                        domain,
                        format!("fetch timed out after {}ms", timeout.as_millis()),
                    ),
                }
            });
        }

        // A panicked task leaves its domain at the "not fetched" record.
        let mut sources = SourceSet::empty();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(record) => sources.set(record),
                Err(e) => debug!(region = %region, error = %e, "source fetch task failed"),
            }
        }

        for domain in Domain::ALL {
            let record = sources.get(domain);
            if !record.available {
                let reason = record.error.clone().unwrap_or_default();
                METRICS.inc_sources_unavailable();
                obs::emit_source_unavailable(region.code(), domain, &reason);
            }
        }
        sources
    }

    /// AI analysis of `assessment`, cached per region for the same
    /// assessment.
    pub async fn analyze(&self, assessment: &CrisisAssessment) -> AiAnalysis {
        let key = assessment.region.code();
        if let Some(cached) = self.analyses.get(key).await {
            if cached.assessment_id == assessment.id {
                return cached;
            }
        }
        let analysis = self
            .orchestrator
            .analyze(assessment)
            .instrument(obs::assessment_span(key))
            .await;
        self.analyses.insert(key, analysis.clone()).await;
        analysis
    }

    pub fn plan(&self, analysis: &AiAnalysis, request: &PlanRequest) -> Result<ResponsePlan> {
        self.engine.generate(analysis, request)
    }

    /// Assessment, analysis and plan in one pass.
    pub async fn run(&self, region: &str, request: &PlanRequest) -> Result<RunReport> {
        let assessment = self.assess(region).await?;
        let analysis = self.analyze(&assessment).await;
        let plan = self.plan(&analysis, request)?;
        Ok(RunReport {
            run_id: Uuid::new_v4().to_string(),
            assessment,
            analysis: Some(analysis),
            plan: Some(plan),
        })
    }

    /// Drop cached results for `region`. Returns `true` if anything was
    /// cached.
    pub async fn invalidate(&self, region: &Region) -> bool {
        let a = self.assessments.invalidate(region.code()).await;
        let b = self.analyses.invalidate(region.code()).await;
        a || b
    }

    /// `(assessment, analysis)` cache statistics.
    pub async fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.assessments.stats().await, self.analyses.stats().await)
    }
}
