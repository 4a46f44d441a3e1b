use async_trait::async_trait;
use std::fmt::Debug;

use crate::{ErrorKind, Result};

/// Delivers a single request and returns the response.
///
/// This is where the actual network I/O happens. The clients call it once per
/// attempt and never retry transport failures on their own. Implement it to
/// plug in a different client stack or to fake the network in tests.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    /// Send `request` and wait for the response head
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        self.execute(request).await.map_err(ErrorKind::NetworkRequest)
    }
}
