//! Source failures degrade their own domain and never abort the pipeline.

use std::sync::Arc;
use std::time::Duration;

use crisiswatch_core::domain::{CrisisError, DataQuality, Domain, OverallRisk, PlanType};
use crisiswatch_core::fakes::{FailingFetcher, Reply, ScriptedTransport, SourceFault};
use crisiswatch_core::{CrisisMonitor, PipelineConfig, PlanRequest, SourcePayloads, METRICS};
use serde_json::json;

fn payloads() -> SourcePayloads {
    SourcePayloads {
        conflict: json!({
            "riskLevel": "CRITICAL",
            "riskScore": 88,
            "fatalities": 140,
            "totalEvents": 60,
            "hotspots": ["Kharkiv"]
        }),
        economic: json!({"indicators": {"inflation": 45.0, "gdpGrowth": -6.0}}),
        climate: json!({"hazards": []}),
        news: json!({"riskLevel": "HIGH"}),
    }
}

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.ai.models.clear();
    config.source_timeout_ms = 500;
    config
}

#[tokio::test(start_paused = true)]
async fn mixed_failures_leave_one_source() {
    let fetcher = FailingFetcher::new(payloads())
        .with_fault(Domain::Economic, SourceFault::Error)
        .with_fault(Domain::Climate, SourceFault::Panic)
        .with_fault(Domain::News, SourceFault::Hang);
    let monitor = CrisisMonitor::new(
        config(),
        Arc::new(fetcher),
        Arc::new(ScriptedTransport::new()),
    )
    .unwrap();
    let unavailable_before = METRICS.sources_unavailable();

    let started = tokio::time::Instant::now();
    let assessment = monitor.assess("UKR").await.unwrap();
    assert_eq!(started.elapsed(), Duration::from_millis(500));

    assert_eq!(assessment.available_sources(), 1);
    assert_eq!(assessment.data_quality, DataQuality::Poor);
    // The lone available source is CRITICAL, so the override still applies.
    assert_eq!(assessment.overall_risk, OverallRisk::Critical);

    let economic = &assessment.sources.economic;
    assert!(!economic.available);
    assert!(economic.error.as_deref().unwrap().contains("injected failure"));
    let news = &assessment.sources.news;
    assert!(news.error.as_deref().unwrap().contains("timed out"));
    assert!(!assessment.sources.climate.available);
    for record in assessment.sources.iter().filter(|r| !r.available) {
        assert!(record.confidence <= 0.3);
        assert_eq!(record.score, 0.0);
    }

    assert!(METRICS.sources_unavailable() >= unavailable_before + 3);
}

#[tokio::test]
async fn all_sources_down_still_produces_full_run() {
    let fetcher = FailingFetcher::new(payloads())
        .with_fault(Domain::Conflict, SourceFault::Error)
        .with_fault(Domain::Economic, SourceFault::Error)
        .with_fault(Domain::Climate, SourceFault::Error)
        .with_fault(Domain::News, SourceFault::Error);
    let monitor = CrisisMonitor::new(
        config(),
        Arc::new(fetcher),
        Arc::new(ScriptedTransport::new()),
    )
    .unwrap();

    let report = monitor
        .run(
            "MMR",
            &PlanRequest {
                plan_type: PlanType::EmergencyOnly,
                population: Some(2_000),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.assessment.overall_risk, OverallRisk::Unknown);
    assert_eq!(report.assessment.confidence, 0.1);
    let analysis = report.analysis.unwrap();
    assert!(analysis.metadata.is_degraded());
    assert_eq!(analysis.comparison.ordinal_distance, None);
    assert_eq!(report.plan.unwrap().target_population, 2_000);
}

#[tokio::test]
async fn no_estimate_and_no_population_is_invalid_input() {
    let monitor = CrisisMonitor::new(
        config(),
        Arc::new(FailingFetcher::new(SourcePayloads::default())),
        Arc::new(ScriptedTransport::new()),
    )
    .unwrap();
    let err = monitor.run("NER", &PlanRequest::default()).await.unwrap_err();
    assert!(matches!(err, CrisisError::InvalidPopulation(0)));
}

#[tokio::test(start_paused = true)]
async fn model_outage_does_not_block_assessment() {
    let mut config = config();
    config.ai.models = vec![crisiswatch_core::ModelSpec::new("primary")];
    config.ai.timeout_ms = 1_000;
    config.ai.max_retries = 1;
    config.ai.backoff_base_ms = 50;
    let transport = Arc::new(ScriptedTransport::new().always("primary", Reply::Hang));
    let monitor = CrisisMonitor::new(
        config,
        Arc::new(FailingFetcher::new(payloads())),
        transport.clone(),
    )
    .unwrap();

    let assessment = monitor.assess("UKR").await.unwrap();
    assert_eq!(assessment.available_sources(), 4);
    let analysis = monitor.analyze(&assessment).await;
    assert!(analysis.metadata.is_degraded());
    assert_eq!(analysis.metadata.elapsed_ms, 2_050);
    assert_eq!(transport.call_count("primary"), 2);

    // A second call for the same assessment is served from the cache.
    let again = monitor.analyze(&assessment).await;
    assert_eq!(again.metadata.generated_at, analysis.metadata.generated_at);
    assert_eq!(transport.call_count("primary"), 2);
}
