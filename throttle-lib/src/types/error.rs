use thiserror::Error;
use url::Url;

/// Possible errors when sending requests through a throttled client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The given string can not be parsed into a valid URL
    #[error("Cannot parse string as URL: {0}")]
    ParseUrl(#[from] url::ParseError),

    /// A possible error when converting a `HeaderValue` from a string or byte
    /// slice, e.g. for an invalid `Content-Type` passed to `post`.
    #[error("Header could not be parsed: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// The default `reqwest` client could not be created
    #[error("Error creating request client: {0}")]
    BuildRequestClient(#[source] reqwest::Error),

    /// The transport failed to deliver the request, e.g. because the
    /// connection was refused. This is never retried.
    #[error("Network error while sending request")]
    NetworkRequest(#[source] reqwest::Error),

    /// A custom [`Transport`](crate::Transport) failed to deliver the request.
    /// This is never retried.
    #[error("Transport failed to send request: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A retry was warranted, but the request body was a stream which cannot
    /// be sent a second time.
    #[error("Cannot retry request to {url}: the request body cannot be replayed")]
    BodyReplay {
        /// The URL of the request that could not be retried
        url: Url,
    },
}

impl ErrorKind {
    /// Return the underlying `reqwest` error, if any
    #[must_use]
    pub const fn reqwest_error(&self) -> Option<&reqwest::Error> {
        match self {
            Self::NetworkRequest(e) | Self::BuildRequestClient(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the error happened while delivering the request, as opposed to
    /// while constructing or replaying it
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkRequest(_) | Self::Transport(_))
    }
}
