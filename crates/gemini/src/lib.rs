//! Client for the Gemini text-model API, used by script analysis.

pub mod client;

pub use client::{GeminiClient, GeminiConfig, GeminiError};
