//! Source fetching seam and the static, file-backed fetcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Domain, Region};

/// Failure to obtain one domain's payload. Mapped to an unavailable record
/// by the monitor and never surfaced to callers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream {domain} source failed: {reason}")]
    Upstream { domain: Domain, reason: String },

    #[error("no {domain} data for region {region}")]
    NoData { domain: Domain, region: String },
}

/// Injectable data source for raw per-domain payloads.
///
/// Implement this for real feed clients, or use [`StaticSourceFetcher`].
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, domain: Domain, region: &Region) -> Result<Value, FetchError>;
}

/// The four raw payloads, each nullable. This is also the CLI input file
/// format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePayloads {
    pub conflict: Value,
    pub economic: Value,
    pub climate: Value,
    pub news: Value,
}

impl SourcePayloads {
    pub fn get(&self, domain: Domain) -> &Value {
        match domain {
            Domain::Conflict => &self.conflict,
            Domain::Economic => &self.economic,
            Domain::Climate => &self.climate,
            Domain::News => &self.news,
        }
    }
}

/// Serves fixed payloads regardless of region. A `null` payload is
/// returned as-is and normalizes to an unavailable record.
#[derive(Debug, Clone, Default)]
pub struct StaticSourceFetcher {
    payloads: SourcePayloads,
}

impl StaticSourceFetcher {
    pub fn new(payloads: SourcePayloads) -> Self {
        Self { payloads }
    }
}

#[async_trait]
impl SourceFetcher for StaticSourceFetcher {
    async fn fetch(&self, domain: Domain, _region: &Region) -> Result<Value, FetchError> {
        Ok(self.payloads.get(domain).clone())
    }
}
