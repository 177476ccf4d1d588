use crate::error::Result;
use crate::request::Request;

/// Executes a built request and returns the response body.
///
/// Implementations must be safe to share between concurrent in-flight
/// requests; the chapter engine issues all page fetches at once.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> Result<String>;
}
