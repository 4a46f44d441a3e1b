//! Per-host rate limiting.
//!
//! Servers tell clients to slow down by answering with `429`, `500` or `503`
//! and, optionally, a `Retry-After` header. This module stores those hints so
//! that later requests to the same destination wait for them.
//!
//! # Architecture
//!
//! - [`RateLimiter`]: the earliest point in time at which a request may be sent
//! - [`HostKey`]: represents a destination host for rate limiting
//! - [`HostPool`]: one lazily created [`RateLimiter`] per host
//! - [`RetryAfter`]: a parsed `Retry-After` header
//! - [`RetryConfig`]: configuration of policy and maximum honored delay

mod config;
mod headers;
mod key;
mod limiter;
mod pool;

pub use config::RetryConfig;
pub use headers::RetryAfter;
pub use key::HostKey;
pub use limiter::RateLimiter;
pub use pool::HostPool;
