use http::header::HOST;
use std::fmt;
use url::Url;

/// A type-safe representation of a destination host for rate limiting
/// purposes.
///
/// Hosts are normalized to lowercase. An explicit non-default port is part
/// of the key, so `localhost:8080` and `localhost:9090` are limited
/// separately.
///
/// # Examples
///
/// ```
/// use throttle_lib::HostKey;
/// use url::Url;
///
/// let url = Url::parse("https://API.github.com/repos/user/repo").unwrap();
/// let host_key = HostKey::from(&url);
/// assert_eq!(host_key.as_str(), "api.github.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HostKey(String);

impl HostKey {
    /// Derive the key for a request.
    ///
    /// An explicit `Host` header takes precedence over the URL. If neither
    /// names a host, the key is empty and all such requests share one
    /// limiter.
    #[must_use]
    pub fn from_request(request: &reqwest::Request) -> Self {
        request
            .headers()
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .filter(|host| !host.is_empty())
            .map_or_else(|| Self::from(request.url()), Self::from)
    }

    /// Get the hostname as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the hostname as an owned String
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&Url> for HostKey {
    fn from(url: &Url) -> Self {
        match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => HostKey(format!("{host}:{port}").to_lowercase()),
            (Some(host), None) => HostKey(host.to_lowercase()),
            (None, _) => HostKey::default(),
        }
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for HostKey {
    fn from(host: String) -> Self {
        HostKey(host.to_lowercase())
    }
}

impl From<&str> for HostKey {
    fn from(host: &str) -> Self {
        HostKey(host.to_lowercase())
    }
}
