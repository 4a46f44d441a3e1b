use http::StatusCode;

use crate::ResponseHead;

/// An extension trait to decide whether a response calls for another
/// attempt.
///
/// Only overload and rate-limit statuses qualify: `429 Too Many Requests`,
/// `500 Internal Server Error` and `503 Service Unavailable`. Transport
/// errors are never retried at this layer.
pub trait RetryExt {
    /// Whether the status is worth another attempt
    fn should_retry(&self) -> bool;
}

impl RetryExt for StatusCode {
    fn should_retry(&self) -> bool {
        matches!(
            *self,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::SERVICE_UNAVAILABLE
        )
    }
}

impl RetryExt for ResponseHead {
    fn should_retry(&self) -> bool {
        self.status.should_retry()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use rstest::rstest;

    use super::RetryExt;

    #[rstest]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, true)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::OK, false)]
    #[case(StatusCode::REQUEST_TIMEOUT, false)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    #[case(StatusCode::GATEWAY_TIMEOUT, false)]
    #[case(StatusCode::FORBIDDEN, false)]
    fn test_should_retry(#[case] status: StatusCode, #[case] expected: bool) {
        assert_eq!(status.should_retry(), expected);
    }
}
