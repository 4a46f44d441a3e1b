use http::{HeaderMap, StatusCode, header::RETRY_AFTER};

/// The status and headers of a received response.
///
/// Retry policies only ever look at these two parts. Keeping them separate
/// from [`reqwest::Response`] lets the executor release a response (and its
/// connection) as soon as it decided to retry, while still remembering the
/// attempt in its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// The response status code
    pub status: StatusCode,
    /// The response headers
    pub headers: HeaderMap,
}

impl ResponseHead {
    /// Create a new response head
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    /// The raw `Retry-After` header value.
    ///
    /// Returns `None` if the header is missing, empty, or contains bytes that
    /// are not visible ASCII.
    #[must_use]
    pub fn retry_after(&self) -> Option<&str> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    }
}

impl From<StatusCode> for ResponseHead {
    fn from(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new())
    }
}

impl From<&reqwest::Response> for ResponseHead {
    fn from(response: &reqwest::Response) -> Self {
        Self::new(response.status(), response.headers().clone())
    }
}
