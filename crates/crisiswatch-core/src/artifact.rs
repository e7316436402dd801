//! Persisted run reports with content digests.
//!
//! Layout: `<dir>/<run_id>/report.json` plus `<dir>/<run_id>/report.digest`
//! (SHA-256 hex of the JSON bytes).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::{AiAnalysis, CrisisAssessment, CrisisError, ResponsePlan, Result};

const REPORT_FILE: &str = "report.json";
const DIGEST_FILE: &str = "report.digest";

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub assessment: CrisisAssessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AiAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<ResponsePlan>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn run_dir(run_id: &str, dir: &Path) -> Result<PathBuf> {
    if run_id.is_empty() || run_id.contains(['/', '\\']) || run_id.contains("..") {
        return Err(CrisisError::ArtifactNotFound(run_id.to_string()));
    }
    Ok(dir.join(run_id))
}

/// Write the report and its digest. Returns the report path.
pub fn write_run_artifact(report: &RunReport, dir: &Path) -> Result<PathBuf> {
    let run_dir = run_dir(&report.run_id, dir)?;
    std::fs::create_dir_all(&run_dir)?;

    let artifact_path = run_dir.join(REPORT_FILE);
    let json = serde_json::to_vec_pretty(report)?;
    let digest = sha256_hex(&json);

    std::fs::write(&artifact_path, &json)?;
    std::fs::write(run_dir.join(DIGEST_FILE), digest.as_bytes())?;

    info!(
        event = "run_artifact_written",
        run_id = %report.run_id,
        path = %artifact_path.display(),
        digest = %digest,
    );
    Ok(artifact_path)
}

/// Read a report back, verifying it against the stored digest.
pub fn read_run_artifact(run_id: &str, dir: &Path) -> Result<RunReport> {
    let run_dir = run_dir(run_id, dir)?;
    let artifact_path = run_dir.join(REPORT_FILE);
    if !artifact_path.is_file() {
        return Err(CrisisError::ArtifactNotFound(
            artifact_path.display().to_string(),
        ));
    }

    let json = std::fs::read(&artifact_path)?;
    let expected = std::fs::read_to_string(run_dir.join(DIGEST_FILE))?;
    let actual = sha256_hex(&json);
    if expected.trim() != actual {
        return Err(CrisisError::DigestMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }

    Ok(serde_json::from_slice(&json)?)
}
