use reqwest::{Request, Response};

use crate::clock::Clock;
use crate::ratelimit::RateLimiter;
use crate::{ErrorKind, ResponseHead, Result, RetryPolicy, Transport};

/// Runs one logical request to completion: waits for the limiter, sends,
/// asks the policy, and goes around again as long as the policy says so.
#[derive(Clone, Copy)]
pub(crate) struct RequestExecutor<'a> {
    pub(crate) transport: &'a dyn Transport,
    pub(crate) policy: &'a dyn RetryPolicy,
    pub(crate) clock: &'a dyn Clock,
}

impl RequestExecutor<'_> {
    /// Send `request` through `limiter`, retrying as the policy decides.
    ///
    /// Returns the first response the policy doesn't want to retry. Responses
    /// that did get retried are dropped, so their bodies are never read.
    /// Transport errors end the loop right away.
    pub(crate) async fn execute(
        &self,
        limiter: &RateLimiter,
        mut request: Request,
    ) -> Result<Response> {
        let mut history: Vec<ResponseHead> = Vec::new();

        loop {
            limiter.wait_until_ready().await;

            // Taken before sending, since sending consumes the request
            let replay = request.try_clone();
            let url = request.url().clone();

            log::debug!(
                "Sending {} {url} (attempt {})",
                request.method(),
                history.len() + 1
            );
            let response = self.transport.send(request).await?;

            let head = ResponseHead::from(&response);
            let decision = self.policy.decide(&head, &history, self.clock.now());
            log::debug!(
                "{url} answered {}, retry: {}",
                head.status,
                decision.retry
            );

            if let Some(time) = decision.next_permitted_at {
                limiter.set_earliest_permitted_at(time);
            }

            if !decision.retry {
                return Ok(response);
            }

            log::info!("Retrying {url} after {}", head.status);
            drop(response);
            history.push(head);

            request = replay.ok_or_else(|| {
                log::warn!("Cannot retry {url}: request body is a stream");
                ErrorKind::BodyReplay { url }
            })?;
        }
    }
}
