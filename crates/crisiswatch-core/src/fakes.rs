//! In-memory fakes for the transport and fetcher seams (testing only).
//!
//! Provides `ScriptedTransport` and `FailingFetcher`, which satisfy the
//! trait contracts without network access.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::ai::{CompletionRequest, ModelTransport, TransportError};
use crate::domain::{Domain, Region};
use crate::sources::{FetchError, SourceFetcher, SourcePayloads};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// One scripted reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Error(String),
    /// Never completes; only a caller-side timeout ends the call.
    Hang,
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }
}

/// Transport that answers from per-model scripts.
///
/// Replies are consumed in order; the last reply of a script repeats.
/// Models without a script fail with `NotConfigured`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: give `model` a script of replies.
    pub fn script(self, model: impl Into<String>, replies: impl IntoIterator<Item = Reply>) -> Self {
        lock(&self.scripts).insert(model.into(), replies.into_iter().collect());
        self
    }

    /// Builder: `model` always answers with `reply`.
    pub fn always(self, model: impl Into<String>, reply: Reply) -> Self {
        self.script(model, [reply])
    }

    /// Model identifiers in call order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, model: &str) -> usize {
        lock(&self.calls).iter().filter(|m| *m == model).count()
    }

    fn next_reply(&self, model: &str) -> Option<Reply> {
        let mut scripts = lock(&self.scripts);
        let script = scripts.get_mut(model)?;
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, TransportError> {
        lock(&self.calls).push(request.model.clone());
        match self.next_reply(&request.model) {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error(msg)) => Err(TransportError::Status {
                model: request.model.clone(),
                status: 503,
                body: msg,
            }),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(TransportError::NotConfigured(format!(
                "no script for model {}",
                request.model
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// FailingFetcher
// ---------------------------------------------------------------------------

/// How a faulty source misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFault {
    Error,
    Hang,
    Panic,
}

/// Serves fixed payloads, except for domains given a fault.
#[derive(Debug, Default)]
pub struct FailingFetcher {
    payloads: SourcePayloads,
    faults: HashMap<Domain, SourceFault>,
    fetches: Mutex<Vec<Domain>>,
}

impl FailingFetcher {
    pub fn new(payloads: SourcePayloads) -> Self {
        Self {
            payloads,
            ..Self::default()
        }
    }

    pub fn with_fault(mut self, domain: Domain, fault: SourceFault) -> Self {
        self.faults.insert(domain, fault);
        self
    }

    /// Domains fetched so far, in completion-start order.
    pub fn fetches(&self) -> Vec<Domain> {
        lock(&self.fetches).clone()
    }
}

#[async_trait]
impl SourceFetcher for FailingFetcher {
    async fn fetch(&self, domain: Domain, region: &Region) -> Result<Value, FetchError> {
        lock(&self.fetches).push(domain);
        match self.faults.get(&domain) {
            None => Ok(self.payloads.get(domain).clone()),
            Some(SourceFault::Error) => Err(FetchError::Upstream {
                domain,
                reason: format!("injected failure for {region}"),
            }),
            Some(SourceFault::Hang) => std::future::pending().await,
            Some(SourceFault::Panic) => panic!("injected panic in {domain} fetch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            system: String::new(),
            prompt: String::new(),
            max_tokens: 10,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_script_consumed_in_order_last_repeats() {
        let t = ScriptedTransport::new().script(
            "m",
            [Reply::Error("busy".into()), Reply::text("ok")],
        );
        assert!(t.complete(&request("m")).await.is_err());
        assert_eq!(t.complete(&request("m")).await.unwrap(), "ok");
        assert_eq!(t.complete(&request("m")).await.unwrap(), "ok");
        assert_eq!(t.call_count("m"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_model_not_configured() {
        let t = ScriptedTransport::new();
        assert!(matches!(
            t.complete(&request("ghost")).await,
            Err(TransportError::NotConfigured(_))
        ));
        assert_eq!(t.calls(), vec!["ghost".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_fetcher_error_fault() {
        let f = FailingFetcher::new(SourcePayloads::default())
            .with_fault(Domain::News, SourceFault::Error);
        let region = Region::parse("HTI").unwrap();
        assert!(f.fetch(Domain::News, &region).await.is_err());
        assert!(f.fetch(Domain::Conflict, &region).await.unwrap().is_null());
    }
}
