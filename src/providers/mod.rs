/// Module for the LLM provider adapters
///
/// This module contains one adapter per supported provider:
/// - Mistral AI
/// - OpenRouter
/// - Hugging Face (inference router)
/// - Google Gemini
///
/// Each adapter implements the common [`ProviderAdapter`] interface, translating one
/// normalized request into the provider's wire call and its failures into an
/// [`AdapterError`](crate::errors::AdapterError) kind.

pub mod adapter;
pub mod types;
pub mod openai_compat;
pub mod mistral;
pub mod openrouter;
pub mod huggingface;
pub mod gemini;

pub use types::{ProviderType, LlmRequest, LlmResponse};
pub use adapter::{ProviderAdapter, BaseAdapter, create_adapter};
pub use mistral::MistralAdapter;
pub use openrouter::OpenRouterAdapter;
pub use huggingface::HuggingFaceAdapter;
pub use gemini::GeminiAdapter;
