//! Observability tests for the pipeline lifecycle events.
//!
//! Events are captured with a scoped `tracing-subscriber` writing into a
//! shared buffer, then checked for their structured fields.

use std::io;
use std::sync::{Arc, Mutex};

use crisiswatch_core::ai::{AiConfig, AiOrchestrator, ModelSpec};
use crisiswatch_core::displacement::DisplacementConstants;
use crisiswatch_core::domain::{Domain, ParseStatus, PlanType, Region, SourceSet};
use crisiswatch_core::fakes::{Reply, ScriptedTransport};
use crisiswatch_core::obs::{
    emit_analysis_completed, emit_model_failure, emit_plan_generated, emit_source_unavailable,
    AssessmentSpan,
};
use crisiswatch_core::{
    build_assessment, normalize, CrisisMonitor, PipelineConfig, SourcePayloads, StaticSourceFetcher,
};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn captured<F: FnOnce()>(f: F) -> String {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .json()
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.text()
}

#[test]
fn source_unavailable_is_a_warning_with_domain() {
    let out = captured(|| emit_source_unavailable("SYR", Domain::Climate, "fetch timed out"));
    assert!(out.contains("\"level\":\"WARN\""));
    assert!(out.contains("source.unavailable"));
    assert!(out.contains("\"domain\":\"climate\""));
    assert!(out.contains("fetch timed out"));
}

#[test]
fn model_failure_carries_model_and_attempt() {
    let out = captured(|| emit_model_failure("AFG", "primary", 2, &"status 503"));
    assert!(out.contains("model.failure"));
    assert!(out.contains("\"model\":\"primary\""));
    assert!(out.contains("\"attempt\":2"));
}

#[test]
fn analysis_and_plan_events_are_info() {
    let out = captured(|| {
        emit_analysis_completed("YEM", "fallback", ParseStatus::Fallback, 3, 4_200);
        emit_plan_generated("YEM", PlanType::Recovery, 5_000, 1_234.5);
    });
    assert!(out.contains("analysis.completed"));
    assert!(out.contains("\"elapsed_ms\":4200"));
    assert!(out.contains("plan.generated"));
    assert!(out.contains("\"target_population\":5000"));
    assert!(!out.contains("\"level\":\"WARN\""));
}

#[test]
fn assessment_span_tags_region() {
    let out = captured(|| {
        let _span = AssessmentSpan::enter("SOM");
        tracing::info!("inside");
    });
    assert!(out.contains("crisiswatch.assessment"));
    assert!(out.contains("\"region\":\"SOM\""));
}

#[test]
fn monitor_emits_assessment_completed() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let out = captured(|| {
        let monitor = CrisisMonitor::new(
            PipelineConfig::default(),
            Arc::new(StaticSourceFetcher::new(SourcePayloads {
                news: serde_json::json!({"riskLevel": "MEDIUM"}),
                ..SourcePayloads::default()
            })),
            Arc::new(ScriptedTransport::new()),
        )
        .unwrap();
        runtime.block_on(async {
            monitor.assess("ETH").await.unwrap();
        });
    });
    assert!(out.contains("assessment.completed"));
    assert!(out.contains("\"overall_risk\":\"LOW\"") || out.contains("\"overall_risk\":\"MINIMAL\""));
    assert_eq!(out.matches("source.unavailable").count(), 3);
}

#[test]
fn every_model_call_emits_an_attempt_event() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let mut sources = SourceSet::empty();
    sources.set(normalize(Domain::News, &serde_json::json!({"riskLevel": "MEDIUM"})));
    let assessment = build_assessment(
        Region::parse("KEN").unwrap(),
        sources,
        &DisplacementConstants::default(),
    );
    let transport = Arc::new(ScriptedTransport::new().script(
        "primary",
        [
            Reply::Error("overloaded".into()),
            Reply::text(
                r#"{"aiRiskAssessment": "LOW", "confidence": 0.5, "reasoning": "calm", "displacementPrediction": {}}"#,
            ),
        ],
    ));
    let config = AiConfig {
        models: vec![ModelSpec::new("primary")],
        backoff_base_ms: 0,
        ..AiConfig::default()
    };

    let out = captured(|| {
        runtime.block_on(async {
            AiOrchestrator::new(config, transport).analyze(&assessment).await;
        });
    });
    assert_eq!(out.matches("model.attempt").count(), 2);
    assert!(out.contains("\"outcome\":\"Failed\""));
    assert!(out.contains("\"outcome\":\"Success\""));
    assert_eq!(out.matches("model.failure").count(), 1);
}
