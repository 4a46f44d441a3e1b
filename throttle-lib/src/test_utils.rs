//! Fakes and helpers for unit tests.

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use url::Url;

use crate::retryable::RetryExt;
use crate::{ErrorKind, ResponseHead, Result, RetryDecision, Transport};

#[macro_export]
/// Creates a mock web server, which responds with a predefined status when
/// handling a matching request
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::any()).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

fn header_map(headers: &[(&str, &str)]) -> HeaderMap {
    headers
        .iter()
        .map(|(name, value)| {
            (
                HeaderName::try_from(*name).expect("Expected valid header name"),
                HeaderValue::from_str(value).expect("Expected valid header value"),
            )
        })
        .collect()
}

/// A response head with the given status and headers
pub(crate) fn head(status: StatusCode, headers: &[(&str, &str)]) -> ResponseHead {
    ResponseHead::new(status, header_map(headers))
}

/// A response with the given status and headers, and an empty body
pub(crate) fn stub_response(status: StatusCode, headers: &[(&str, &str)]) -> reqwest::Response {
    let mut builder = http::Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    reqwest::Response::from(builder.body("").expect("Expected valid response"))
}

/// Retries every retryable status immediately, without touching the limiter
pub(crate) fn retry_immediately(
    response: &ResponseHead,
    _history: &[ResponseHead],
    _now: SystemTime,
) -> RetryDecision {
    RetryDecision::new(response.should_retry(), None)
}

/// What a [`ScriptedTransport`] saw of a request
#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Vec<u8>>,
}

#[derive(Debug)]
enum Reply {
    Response(StatusCode, HeaderMap),
    Error,
}

/// A [`Transport`] that answers with a fixed script of replies.
///
/// Each reply is either consumed by the first request whose host matches, or
/// by any request if no host was given. Running out of replies is a test bug
/// and panics.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<(Option<String>, Reply)>>>,
    sent: Arc<Mutex<Vec<SentRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reply to the next request with `status` and `headers`
    pub(crate) fn reply(self, status: StatusCode, headers: &[(&str, &str)]) -> Self {
        self.push(None, Reply::Response(status, header_map(headers)))
    }

    /// Reply to the next request for `host` with `status` and `headers`
    pub(crate) fn reply_for(
        self,
        host: &str,
        status: StatusCode,
        headers: &[(&str, &str)],
    ) -> Self {
        self.push(
            Some(host.to_string()),
            Reply::Response(status, header_map(headers)),
        )
    }

    /// Fail the next request as if the connection was refused
    pub(crate) fn fail(self) -> Self {
        self.push(None, Reply::Error)
    }

    fn push(self, host: Option<String>, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back((host, reply));
        self
    }

    /// All requests received so far, in order
    pub(crate) fn sent(&self) -> Vec<SentRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        let host = request.url().host_str().unwrap_or_default().to_string();
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentRequest {
                method: request.method().clone(),
                url: request.url().clone(),
                headers: request.headers().clone(),
                body: request
                    .body()
                    .and_then(reqwest::Body::as_bytes)
                    .map(<[u8]>::to_vec),
            });

        let reply = {
            let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
            let position = replies
                .iter()
                .position(|(matcher, _)| matcher.as_deref().is_none_or(|m| m == host))
                .unwrap_or_else(|| panic!("No scripted reply left for host `{host}`"));
            replies.remove(position).map(|(_, reply)| reply)
        };

        match reply {
            Some(Reply::Response(status, headers)) => {
                let mut response = stub_response(status, &[]);
                *response.headers_mut() = headers;
                Ok(response)
            }
            Some(Reply::Error) | None => Err(ErrorKind::Transport(Box::new(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ))),
        }
    }
}
