//! Core building blocks for the VSDP Living Intelligence Copilot.
//!
//! This crate is deliberately free of any HTTP-server concerns.  It owns:
//! - the knowledge corpus catalog, loader and process-lifetime cache,
//! - the persona / system-prompt builder,
//! - the per-client fixed-window rate limiter,
//! - the completion-provider abstraction and the Anthropic client,
//!   including the two-phase streaming probe.
//!
//! The server binary composes these pieces into request handlers; every
//! piece of mutable state here is owned by whoever constructs it, so tests
//! can substitute fakes and control time.

pub mod knowledge;
pub mod prompt;
pub mod provider;
pub mod ratelimit;
pub mod section;

pub use knowledge::{CorpusCache, KnowledgeProfile};
pub use provider::{ChatTurn, CompletionProvider, CompletionRequest, ProviderError, Role};
pub use ratelimit::FixedWindowLimiter;
pub use section::StakeholderSection;
