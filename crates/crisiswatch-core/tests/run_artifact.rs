//! Run artifacts: persistence, digest verification and tamper detection.

use std::sync::Arc;

use crisiswatch_core::domain::{CrisisError, PlanType};
use crisiswatch_core::fakes::ScriptedTransport;
use crisiswatch_core::{
    read_run_artifact, write_run_artifact, CrisisMonitor, PipelineConfig, PlanRequest, RunReport,
    SourcePayloads, StaticSourceFetcher,
};
use serde_json::json;
use tempfile::tempdir;

async fn report() -> RunReport {
    let mut config = PipelineConfig::default();
    config.ai.models.clear();
    let payloads = SourcePayloads {
        conflict: json!({"riskLevel": "HIGH", "riskScore": 72}),
        economic: json!({"riskLevel": "CRITICAL", "riskScore": 85}),
        ..SourcePayloads::default()
    };
    let monitor = CrisisMonitor::new(
        config,
        Arc::new(StaticSourceFetcher::new(payloads)),
        Arc::new(ScriptedTransport::new()),
    )
    .unwrap();
    monitor
        .run(
            "VEN",
            &PlanRequest {
                plan_type: PlanType::Comprehensive,
                population: Some(12_500),
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn written_artifact_reads_back_identically() {
    let dir = tempdir().unwrap();
    let report = report().await;

    let path = write_run_artifact(&report, dir.path()).unwrap();
    assert!(path.ends_with(format!("{}/report.json", report.run_id)));
    let digest = std::fs::read_to_string(dir.path().join(&report.run_id).join("report.digest")).unwrap();
    assert_eq!(digest.len(), 64);

    let loaded = read_run_artifact(&report.run_id, dir.path()).unwrap();
    assert_eq!(loaded, report);
}

#[tokio::test]
async fn tampered_artifact_fails_digest_check() {
    let dir = tempdir().unwrap();
    let report = report().await;
    let path = write_run_artifact(&report, dir.path()).unwrap();

    let original = std::fs::read_to_string(&path).unwrap();
    let tampered = original.replacen("\"CRITICAL\"", "\"LOW\"", 1);
    assert_ne!(original, tampered);
    std::fs::write(&path, tampered).unwrap();

    match read_run_artifact(&report.run_id, dir.path()) {
        Err(CrisisError::DigestMismatch { expected, actual }) => assert_ne!(expected, actual),
        other => panic!("expected DigestMismatch, got {other:?}"),
    }
}

#[test]
fn missing_artifact_is_not_found() {
    let dir = tempdir().unwrap();
    let err = read_run_artifact("no-such-run", dir.path()).unwrap_err();
    assert!(matches!(err, CrisisError::ArtifactNotFound(_)));
}
