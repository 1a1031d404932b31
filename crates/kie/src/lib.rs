//! Client for the Kie.ai generation API.
//!
//! [`client::KieClient`] submits video and image generation jobs over
//! REST; [`callback`] models the webhook payloads the provider posts
//! back when a job finishes, and builds the callback URLs handed out at
//! submission time.

pub mod callback;
pub mod client;

pub use callback::{callback_url, CallbackEnvelope};
pub use client::{KieClient, KieConfig, KieError};

/// Success value of the `code` field in Kie.ai response and callback
/// bodies. Everything else is a provider-side failure.
pub const SUCCESS_CODE: i64 = 200;
