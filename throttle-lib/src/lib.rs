//! `throttle` wraps an HTTP client with self-imposed rate limiting and
//! automatic retries that honor the server's `Retry-After` header.
//!
//! "Hello world" example:
//! ```no_run
//! use throttle_lib::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let response = throttle_lib::get("https://example.com").await?;
//!   println!("{}", response.status());
//!   Ok(())
//! }
//! ```
//!
//! For more control, build a client yourself with the [`ClientBuilder`].
//! A [`MultiHostClient`] keeps one rate limiter per destination host, while a
//! [`Client`] shares a single limiter for everything it sends:
//!
//! ```no_run
//! use std::time::Duration;
//! use throttle_lib::{ClientBuilder, PolicyKind, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let client = ClientBuilder::builder()
//!       .policy(PolicyKind::ExponentialBackoff)
//!       .max_retry_after(Duration::from_secs(60))
//!       .build()
//!       .multi_host_client()?;
//!   let response = client.get("https://example.com").await?;
//!   assert!(response.status().is_success());
//!   Ok(())
//! }
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod backoff;
mod client;
mod executor;
mod retryable;
mod transport;
mod types;

pub mod clock;
pub mod policy;
pub mod ratelimit;

#[cfg(test)]
#[macro_use]
pub mod test_utils;

#[cfg(feature = "native-tls")]
use openssl_sys as _; // required for vendored-openssl feature

pub use crate::{
    backoff::exponential_backoff,
    client::{
        Client, ClientBuilder, DEFAULT_USER_AGENT, MultiHostClient, default_client, get, head,
        post, post_form,
    },
    clock::{Clock, FrozenClock, RecordingSleeper, Sleeper, SystemClock, TokioSleeper},
    policy::{
        DEFAULT_MAX_RETRY_AFTER, ExponentialBackoff, IdiomaticRetryAfter, PolicyKind,
        RetryAfterDate, RetryAfterSeconds, RetryDecision, RetryPolicy,
    },
    ratelimit::{HostKey, HostPool, RateLimiter, RetryConfig},
    retryable::RetryExt,
    transport::Transport,
    types::{ErrorKind, ResponseHead, Result},
};
