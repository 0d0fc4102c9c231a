//! movie-finder: search a movie dataset and ask a hosted LLM for recommendations.
//!
//! # Overview
//! Two independent flows share one in-memory dataset:
//!
//! - Filtering the catalog by title, year, rating floor and genre
//! - Asking a chat-completion backend for recommendations, streamed fragment by fragment,
//!   and speaking the last reply through a text-to-speech backend
//!
//! The terminal front-end lives in `src/bin/movie-finder.rs`; everything it needs is here.

// Re-export for convenience
pub use async_trait::async_trait;

/// The movie dataset and its read-only aggregates
pub mod movie;

/// Filter criteria and the filter engine
pub mod filter;

/// Chat-based interactions with language models
pub mod chat;

/// Text-to-speech support
pub mod tts;

/// Shared implementation for OpenAI-compatible APIs
pub mod providers;

/// Backend implementations (Groq, OpenAI, Google Translate speech)
pub mod backends;

/// Builder pattern for configuring and instantiating providers
pub mod builder;

/// Error types and handling
pub mod error;

/// The movie assistant: prompt validation and streamed reply accumulation
pub mod assistant;

/// Speech playback of the assistant's reply
pub mod speech;

/// UI state with a single reset operation
pub mod session;

/// Event handlers for search, clear, ask and speak
pub mod app;

/// Secret store for API keys
pub mod secret_store;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Core trait that every backend implements. A backend that lacks a
/// capability keeps the default method, which returns an error.
pub trait LLMProvider: chat::ChatProvider + tts::TextToSpeechProvider {}
