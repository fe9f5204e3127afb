//! # Ultrafast Models SDK
//!
//! The provider-adapter layer of the gateway: a canonical chat-completion
//! request/response shape plus one adapter per upstream provider (OpenAI,
//! Anthropic, Gemini, Ollama, Mistral, Cohere), each translating to and
//! from that provider's own wire format.
//!
//! Adapters never talk to each other or know about caching, rate
//! limiting, or failover — that orchestration lives in the gateway binary
//! and depends on this crate only through [`providers::ProviderAdapter`]
//! and [`error::ProviderError`].

pub mod error;
pub mod guardrails;
pub mod models;
pub mod providers;

pub use error::ProviderError;
pub use models::{CanonicalRequest, CanonicalResponse, ProviderId};
pub use providers::{ProviderAdapter, ProviderConfig, ProviderRegistry};
