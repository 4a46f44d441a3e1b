//! `test-utils` is used for testing in both `throttle-lib` and `throttle-bin`.
//! This crate does not depend on `throttle-lib` or `throttle-bin`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies.

/// Create a mock web server, which responds with a predefined status when
/// handling any request
#[macro_export]
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::any()).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// Create a mock web server that answers the first `$limited` requests with
/// `429 Too Many Requests` and the given `Retry-After` value, and every
/// request after that with `$status`
#[macro_export]
macro_rules! rate_limited_mock_server {
    ($retry_after:expr, $limited:expr, $status:expr $(,)?) => {{
        let mock_server = wiremock::MockServer::start().await;

        let limited = wiremock::ResponseTemplate::new(http::StatusCode::TOO_MANY_REQUESTS)
            .insert_header("Retry-After", $retry_after);
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(limited)
            .up_to_n_times($limited)
            .expect($limited)
            .mount(&mock_server)
            .await;

        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(http::StatusCode::from($status)))
            .mount(&mock_server)
            .await;

        mock_server
    }};
}

/// Build an absolute URL for `$path` on a mock server
#[macro_export]
macro_rules! mock_url {
    ($server:expr, $path:expr) => {
        format!("{}{}", $server.uri(), $path)
    };
}
