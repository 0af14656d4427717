//! Strategic inference boundary.
//!
//! The reasoning backend is opaque to the kernel: a prompt goes out, text
//! comes back, and everything that can go wrong is an [`InferenceError`] the
//! router recovers from locally.

mod http;

use async_trait::async_trait;

use crate::error::InferenceError;

pub use http::HttpInferenceClient;

/// Async text-completion service. Implementations must be cancel-safe: the
/// router aborts in-flight calls on teardown and discards late results.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, InferenceError>;
}
