//! Handler of HTTP requests with self-imposed rate limiting.
//!
//! There are two clients:
//!
//! - [`Client`] shares a single [`RateLimiter`] between all requests it
//!   sends. Use it when talking to one service.
//! - [`MultiHostClient`] keeps one limiter per destination host, so a host
//!   asking to back off never slows down requests to other hosts.
//!
//! Both are created by a [`ClientBuilder`].
#![allow(clippy::default_trait_access)]
use std::{
    fmt,
    sync::{Arc, OnceLock},
    time::Duration,
};

use http::{
    HeaderMap, HeaderValue, Method,
    header::{CONTENT_TYPE, USER_AGENT},
};
use reqwest::{Request, Response};
use typed_builder::TypedBuilder;
use url::Url;

use crate::{
    ErrorKind, HostKey, HostPool, PolicyKind, RateLimiter, Result, RetryPolicy, Transport,
    clock::{Clock, Sleeper, SystemClock, TokioSleeper},
    executor::RequestExecutor,
    policy::DEFAULT_MAX_RETRY_AFTER,
};

/// Default user agent, `throttle-<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("throttle/", env!("CARGO_PKG_VERSION"));

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Builder for [`Client`] and [`MultiHostClient`].
///
/// See crate-level documentation for usage example.
#[derive(TypedBuilder, Clone)]
#[builder(builder_method(doc = "
Create a builder for building `ClientBuilder`.

On the builder call, call methods with same name as its fields to set their values.

Finally, call `.build()` to create the instance of `ClientBuilder`.
"))]
pub struct ClientBuilder {
    /// Send requests through this `reqwest` client.
    ///
    /// When given, [`ClientBuilder::user_agent`] and
    /// [`ClientBuilder::timeout`] are ignored since the client was already
    /// configured by the caller.
    #[builder(default, setter(strip_option))]
    reqwest_client: Option<reqwest::Client>,

    /// Send requests through a custom [`Transport`].
    ///
    /// Takes precedence over [`ClientBuilder::reqwest_client`].
    #[builder(default, setter(strip_option))]
    transport: Option<Arc<dyn Transport>>,

    /// Which of the built-in retry policies to use.
    ///
    /// Defaults to [`PolicyKind::Idiomatic`], which honors `Retry-After` and
    /// falls back to exponential backoff.
    #[builder(default, setter(into))]
    policy: PolicyKind,

    /// A custom retry policy, e.g. a closure.
    ///
    /// Takes precedence over [`ClientBuilder::policy`].
    #[builder(default, setter(strip_option))]
    custom_policy: Option<Arc<dyn RetryPolicy>>,

    /// Give up retrying once the delay requested by the server (or computed
    /// by the backoff) reaches this duration.
    ///
    /// Only used with the built-in policies. Defaults to 720 hours.
    #[builder(default = DEFAULT_MAX_RETRY_AFTER)]
    max_retry_after: Duration,

    /// Source of the current time. Defaults to the system clock.
    #[builder(default, setter(strip_option))]
    clock: Option<Arc<dyn Clock>>,

    /// Used to wait for a rate limiter. Defaults to `tokio::time::sleep`.
    #[builder(default, setter(strip_option))]
    sleeper: Option<Arc<dyn Sleeper>>,

    /// User-agent used for the default `reqwest` client.
    ///
    /// Defaults to "throttle/<PKG_VERSION>".
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)", setter(into))]
    user_agent: String,

    /// Response timeout per attempt for the default `reqwest` client.
    ///
    /// Waiting for a rate limiter does not count towards it.
    #[builder(default, setter(strip_option))]
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("reqwest_client", &self.reqwest_client)
            .field("transport", &self.transport)
            .field("policy", &self.policy)
            .field("custom_policy", &self.custom_policy.is_some())
            .field("max_retry_after", &self.max_retry_after)
            .field("clock", &self.clock)
            .field("sleeper", &self.sleeper)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientBuilder {
    /// Instantiates a [`Client`] with a single shared rate limiter.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The user-agent is invalid.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn client(self) -> Result<Client> {
        let transport = self.build_transport()?;
        let (clock, sleeper) = self.clock_and_sleeper();

        Ok(Client {
            transport,
            policy: self.build_policy(),
            limiter: Arc::new(RateLimiter::new(Arc::clone(&clock), sleeper)),
            clock,
        })
    }

    /// Instantiates a [`MultiHostClient`] with one rate limiter per host.
    ///
    /// # Errors
    ///
    /// Same as [`ClientBuilder::client`].
    pub fn multi_host_client(self) -> Result<MultiHostClient> {
        let transport = self.build_transport()?;
        let (clock, sleeper) = self.clock_and_sleeper();

        Ok(MultiHostClient {
            transport,
            policy: self.build_policy(),
            pool: HostPool::new(Arc::clone(&clock), sleeper),
            clock,
        })
    }

    fn build_transport(&self) -> Result<Arc<dyn Transport>> {
        if let Some(transport) = &self.transport {
            return Ok(Arc::clone(transport));
        }
        if let Some(reqwest_client) = &self.reqwest_client {
            return Ok(Arc::new(reqwest_client.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(ErrorKind::InvalidHeader)?,
        );

        let builder = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers);

        let reqwest_client = (match self.timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        })
        .build()
        .map_err(ErrorKind::BuildRequestClient)?;

        Ok(Arc::new(reqwest_client))
    }

    fn build_policy(&self) -> Arc<dyn RetryPolicy> {
        match &self.custom_policy {
            Some(policy) => Arc::clone(policy),
            None => self.policy.into_policy(self.max_retry_after),
        }
    }

    fn clock_and_sleeper(&self) -> (Arc<dyn Clock>, Arc<dyn Sleeper>) {
        let clock: Arc<dyn Clock> = match &self.clock {
            Some(clock) => Arc::clone(clock),
            None => Arc::new(SystemClock),
        };
        let sleeper: Arc<dyn Sleeper> = match &self.sleeper {
            Some(sleeper) => Arc::clone(sleeper),
            None => Arc::new(TokioSleeper),
        };
        (clock, sleeper)
    }
}

/// Sends requests through a single rate limiter shared by all destinations.
///
/// Cloning is cheap; clones share the limiter.
///
/// See [`ClientBuilder`] which contains sane defaults for all configuration
/// options.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    policy: Arc<dyn RetryPolicy>,
    clock: Arc<dyn Clock>,
    limiter: Arc<RateLimiter>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Send `request`, waiting for the rate limiter and retrying as the
    /// policy decides.
    ///
    /// Returns the final response, which may still carry a retryable status
    /// if the policy gave up.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the transport fails, or if a retry is due but the
    /// request body is a stream that cannot be sent again.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        self.executor().execute(&self.limiter, request).await
    }

    /// Send a `GET` request to `url`.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` is invalid, or see [`Client::execute`].
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(new_request(Method::GET, url)?).await
    }

    /// Send a `HEAD` request to `url`.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` is invalid, or see [`Client::execute`].
    pub async fn head(&self, url: &str) -> Result<Response> {
        self.execute(new_request(Method::HEAD, url)?).await
    }

    /// Send a `POST` request with the given body and `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` or `content_type` is invalid, or see
    /// [`Client::execute`].
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<reqwest::Body>,
    ) -> Result<Response> {
        self.execute(post_request(url, content_type, body)?).await
    }

    /// Send a `POST` request with `pairs` as URL-encoded form body.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` is invalid, or see [`Client::execute`].
    pub async fn post_form<I, K, V>(&self, url: &str, pairs: I) -> Result<Response>
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.execute(post_request(url, FORM_CONTENT_TYPE, encode_form(pairs))?)
            .await
    }

    /// The rate limiter shared by all requests of this client
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn executor(&self) -> RequestExecutor<'_> {
        RequestExecutor {
            transport: &*self.transport,
            policy: &*self.policy,
            clock: &*self.clock,
        }
    }
}

/// Sends requests through one rate limiter per destination host.
///
/// The host is taken from the request's `Host` header if set, else from its
/// URL. Requests without any host share one limiter.
///
/// Cloning is cheap; clones share all limiters.
#[derive(Clone)]
pub struct MultiHostClient {
    transport: Arc<dyn Transport>,
    policy: Arc<dyn RetryPolicy>,
    clock: Arc<dyn Clock>,
    pool: HostPool,
}

impl fmt::Debug for MultiHostClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiHostClient")
            .field("transport", &self.transport)
            .field("hosts", &self.pool.hosts())
            .finish_non_exhaustive()
    }
}

impl MultiHostClient {
    /// Send `request` through the rate limiter of its destination host,
    /// retrying as the policy decides.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the transport fails, or if a retry is due but the
    /// request body is a stream that cannot be sent again.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let limiter = self.pool.get_or_create(&HostKey::from_request(&request));
        let executor = RequestExecutor {
            transport: &*self.transport,
            policy: &*self.policy,
            clock: &*self.clock,
        };
        executor.execute(&limiter, request).await
    }

    /// Send a `GET` request to `url`.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` is invalid, or see [`MultiHostClient::execute`].
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(new_request(Method::GET, url)?).await
    }

    /// Send a `HEAD` request to `url`.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` is invalid, or see [`MultiHostClient::execute`].
    pub async fn head(&self, url: &str) -> Result<Response> {
        self.execute(new_request(Method::HEAD, url)?).await
    }

    /// Send a `POST` request with the given body and `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` or `content_type` is invalid, or see
    /// [`MultiHostClient::execute`].
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<reqwest::Body>,
    ) -> Result<Response> {
        self.execute(post_request(url, content_type, body)?).await
    }

    /// Send a `POST` request with `pairs` as URL-encoded form body.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if `url` is invalid, or see [`MultiHostClient::execute`].
    pub async fn post_form<I, K, V>(&self, url: &str, pairs: I) -> Result<Response>
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.execute(post_request(url, FORM_CONTENT_TYPE, encode_form(pairs))?)
            .await
    }

    /// Drop the rate limiter of `host`, so the next request to it starts
    /// with a fresh one.
    ///
    /// Returns `true` if the host had a limiter.
    pub fn forget_host(&self, host: &str) -> bool {
        self.pool.forget(host)
    }

    /// The per-host rate limiters of this client
    #[must_use]
    pub const fn pool(&self) -> &HostPool {
        &self.pool
    }
}

fn new_request(method: Method, url: &str) -> Result<Request> {
    Ok(Request::new(method, Url::parse(url)?))
}

fn post_request(url: &str, content_type: &str, body: impl Into<reqwest::Body>) -> Result<Request> {
    let mut request = new_request(Method::POST, url)?;
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_str(content_type)?);
    *request.body_mut() = Some(body.into());
    Ok(request)
}

/// Pairs are encoded in the order given.
fn encode_form<I, K, V>(pairs: I) -> String
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

static DEFAULT_CLIENT: OnceLock<MultiHostClient> = OnceLock::new();

/// The process-wide [`MultiHostClient`] behind the free functions
/// [`get`], [`head`], [`post`] and [`post_form`].
///
/// It is created on first use with the default [`ClientBuilder`] settings.
///
/// # Errors
///
/// Returns an `Err` if the client cannot be created. Creation is attempted
/// again on the next call.
pub fn default_client() -> Result<&'static MultiHostClient> {
    if let Some(client) = DEFAULT_CLIENT.get() {
        return Ok(client);
    }
    let client = ClientBuilder::default().multi_host_client()?;
    Ok(DEFAULT_CLIENT.get_or_init(|| client))
}

/// A convenience function to send a `GET` request through the
/// [`default_client`].
///
/// # Errors
///
/// See [`MultiHostClient::get`].
pub async fn get(url: &str) -> Result<Response> {
    default_client()?.get(url).await
}

/// A convenience function to send a `HEAD` request through the
/// [`default_client`].
///
/// # Errors
///
/// See [`MultiHostClient::head`].
pub async fn head(url: &str) -> Result<Response> {
    default_client()?.head(url).await
}

/// A convenience function to send a `POST` request through the
/// [`default_client`].
///
/// # Errors
///
/// See [`MultiHostClient::post`].
pub async fn post(
    url: &str,
    content_type: &str,
    body: impl Into<reqwest::Body>,
) -> Result<Response> {
    default_client()?.post(url, content_type, body).await
}

/// A convenience function to send a form through the [`default_client`].
///
/// # Errors
///
/// See [`MultiHostClient::post_form`].
pub async fn post_form<I, K, V>(url: &str, pairs: I) -> Result<Response>
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    default_client()?.post_form(url, pairs).await
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        FrozenClock, RecordingSleeper, mock_server,
        test_utils::{ScriptedTransport, retry_immediately},
    };

    struct Harness {
        transport: ScriptedTransport,
        clock: FrozenClock,
        sleeper: RecordingSleeper,
    }

    impl Harness {
        fn new(transport: ScriptedTransport, now: SystemTime) -> Self {
            let clock = FrozenClock::new(now);
            let sleeper = RecordingSleeper::advancing(clock.clone());
            Self {
                transport,
                clock,
                sleeper,
            }
        }

        fn builder(&self) -> ClientBuilder {
            ClientBuilder::builder()
                .transport(Arc::new(self.transport.clone()))
                .clock(Arc::new(self.clock.clone()))
                .sleeper(Arc::new(self.sleeper.clone()))
                .build()
        }
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::default();
        assert_eq!(builder.policy, PolicyKind::Idiomatic);
        assert_eq!(builder.max_retry_after, DEFAULT_MAX_RETRY_AFTER);
        assert_eq!(builder.user_agent, DEFAULT_USER_AGENT);
        assert!(builder.timeout.is_none());
    }

    #[test]
    fn test_invalid_user_agent() {
        let result = ClientBuilder::builder()
            .user_agent("bad\nagent")
            .build()
            .client();
        assert!(matches!(result, Err(ErrorKind::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let harness = Harness::new(ScriptedTransport::new(), SystemTime::now());
        let client = harness.builder().client().unwrap();

        let result = client.get("not a url").await;
        assert!(matches!(result, Err(ErrorKind::ParseUrl(_))));
        assert!(harness.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_then_success() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let harness = Harness::new(
            ScriptedTransport::new()
                .reply(StatusCode::TOO_MANY_REQUESTS, &[("Retry-After", "10")])
                .reply(StatusCode::OK, &[]),
            now,
        );
        let client = harness.builder().client().unwrap();

        let response = client.get("https://example.com/").await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            client.limiter().earliest_permitted_at(),
            now + Duration::from_secs(10)
        );
        assert_eq!(harness.sleeper.sleeps(), vec![Duration::from_secs(10)]);
    }

    #[tokio::test]
    async fn test_single_limiter_is_shared_across_hosts() {
        let harness = Harness::new(
            ScriptedTransport::new()
                .reply_for("a.example", StatusCode::OK, &[("Retry-After", "10")])
                .reply_for("b.example", StatusCode::OK, &[]),
            SystemTime::now(),
        );
        let client = harness.builder().client().unwrap();

        client.get("https://a.example/").await.unwrap();
        client.get("https://b.example/").await.unwrap();

        assert_eq!(harness.sleeper.sleeps(), vec![Duration::from_secs(10)]);
    }

    async fn query_hosts(order: &[&str]) -> Vec<Duration> {
        let mut transport = ScriptedTransport::new();
        for host in order {
            let delay = if *host == "a.example" { "10" } else { "5" };
            transport = transport
                .reply_for(host, StatusCode::TOO_MANY_REQUESTS, &[("Retry-After", delay)])
                .reply_for(host, StatusCode::OK, &[]);
        }
        let harness = Harness::new(transport, SystemTime::now());
        let client = harness.builder().multi_host_client().unwrap();

        for host in order {
            let response = client.get(&format!("https://{host}/")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(client.pool().len(), 2);
        harness.sleeper.sleeps()
    }

    #[tokio::test]
    async fn test_hosts_wait_independently() {
        assert_eq!(
            query_hosts(&["a.example", "b.example"]).await,
            vec![Duration::from_secs(10), Duration::from_secs(5)]
        );
        assert_eq!(
            query_hosts(&["b.example", "a.example"]).await,
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_success_with_retry_after_delays_next_request() {
        let now = SystemTime::now();
        let harness = Harness::new(
            ScriptedTransport::new()
                .reply(StatusCode::OK, &[("Retry-After", "30")])
                .reply(StatusCode::OK, &[]),
            now,
        );
        let client = harness.builder().multi_host_client().unwrap();

        client.get("https://example.com/a").await.unwrap();
        assert!(harness.sleeper.sleeps().is_empty());

        client.get("https://example.com/b").await.unwrap();
        assert_eq!(harness.sleeper.sleeps(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_forget_host_resets_limiter() {
        let harness = Harness::new(
            ScriptedTransport::new()
                .reply(StatusCode::OK, &[("Retry-After", "30")])
                .reply(StatusCode::OK, &[]),
            SystemTime::now(),
        );
        let client = harness.builder().multi_host_client().unwrap();

        client.get("https://Example.com/a").await.unwrap();
        assert!(client.forget_host("example.com"));
        assert!(!client.forget_host("example.com"));

        client.get("https://example.com/b").await.unwrap();
        assert!(harness.sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_post_sets_content_type_and_body() {
        let harness = Harness::new(
            ScriptedTransport::new()
                .reply(StatusCode::SERVICE_UNAVAILABLE, &[])
                .reply(StatusCode::SERVICE_UNAVAILABLE, &[])
                .reply(StatusCode::CREATED, &[]),
            SystemTime::now(),
        );
        let client = ClientBuilder::builder()
            .transport(Arc::new(harness.transport.clone()))
            .custom_policy(Arc::new(retry_immediately))
            .build()
            .client()
            .unwrap();

        let response = client
            .post("https://example.com/items", "text/plain", "hello")
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let sent = harness.transport.sent();
        assert_eq!(sent.len(), 3);
        for request in sent {
            assert_eq!(request.method, Method::POST);
            assert_eq!(request.headers[CONTENT_TYPE], "text/plain");
            assert_eq!(request.body.as_deref(), Some(b"hello".as_slice()));
        }
    }

    #[tokio::test]
    async fn test_post_invalid_content_type() {
        let harness = Harness::new(ScriptedTransport::new(), SystemTime::now());
        let client = harness.builder().client().unwrap();

        let result = client
            .post("https://example.com/", "text/plain\r\n", "")
            .await;
        assert!(matches!(result, Err(ErrorKind::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_post_form_encodes_pairs_in_order() {
        let harness = Harness::new(
            ScriptedTransport::new().reply(StatusCode::OK, &[]),
            SystemTime::now(),
        );
        let client = harness.builder().multi_host_client().unwrap();

        client
            .post_form(
                "https://example.com/login",
                [("user", "jane doe"), ("pass", "a&b=c"), ("user", "again")],
            )
            .await
            .unwrap();

        let sent = harness.transport.sent();
        assert_eq!(sent[0].headers[CONTENT_TYPE], FORM_CONTENT_TYPE);
        assert_eq!(
            sent[0].body.as_deref(),
            Some(b"user=jane+doe&pass=a%26b%3Dc&user=again".as_slice())
        );
    }

    #[tokio::test]
    async fn test_head() {
        let harness = Harness::new(
            ScriptedTransport::new().reply(StatusCode::OK, &[]),
            SystemTime::now(),
        );
        let client = harness.builder().client().unwrap();

        client.head("https://example.com/").await.unwrap();
        assert_eq!(harness.transport.sent()[0].method, Method::HEAD);
    }

    #[tokio::test]
    async fn test_host_header_selects_limiter() {
        let harness = Harness::new(
            ScriptedTransport::new()
                .reply(StatusCode::OK, &[("Retry-After", "10")])
                .reply(StatusCode::OK, &[]),
            SystemTime::now(),
        );
        let client = harness.builder().multi_host_client().unwrap();

        let mut request = Request::new(Method::GET, "http://10.0.0.1/".parse().unwrap());
        request
            .headers_mut()
            .insert(http::header::HOST, HeaderValue::from_static("service.internal"));
        client.execute(request).await.unwrap();

        assert_eq!(client.pool().hosts(), vec![HostKey::from("service.internal")]);

        // a different host is not affected
        client.get("http://10.0.0.1/").await.unwrap();
        assert!(harness.sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_mock_server_roundtrip() {
        let mock_server = mock_server!(StatusCode::OK, set_body_string("hello"));
        let client = ClientBuilder::default().client().unwrap();

        let response = client.get(&mock_server.uri()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "hello");
    }

    #[test]
    fn test_default_client_is_shared() {
        let first = default_client().unwrap();
        let second = default_client().unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
