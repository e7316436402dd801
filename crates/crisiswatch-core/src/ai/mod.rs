//! AI-augmented analysis of a crisis assessment.
//!
//! - [`transport`]: the completion seam (`ModelTransport`)
//! - [`http`]: OpenAI-compatible HTTP transport
//! - [`prompt`]: prompt and response schema
//! - [`parse`]: strict parse with regex repair
//! - [`merge`]: agreement, priority, escalation and the heuristic fallback
//! - [`orchestrator`]: the model-chain state machine

pub mod http;
pub mod merge;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod transport;

pub use http::HttpTransport;
pub use merge::{compare, fallback_response, priority_score, requires_escalation};
pub use orchestrator::{AiConfig, AiOrchestrator, ModelSpec};
pub use parse::{parse_response, ModelResponse, ParseOutcome};
pub use transport::{CompletionRequest, ModelTransport, TransportError};
