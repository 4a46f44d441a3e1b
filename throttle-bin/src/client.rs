use crate::options::{Command, Config};
use anyhow::{Context, Result};
use reqwest::Response;
use throttle_lib::{Client, ClientBuilder, MultiHostClient};

/// Either client flavor, as selected by `--single-host`
#[derive(Debug, Clone)]
pub(crate) enum Sender {
    Single(Client),
    PerHost(MultiHostClient),
}

/// Creates a client according to the command-line config
pub(crate) fn create(cfg: &Config) -> Result<Sender> {
    let retry = cfg.retry();

    let builder = ClientBuilder::builder()
        .policy(retry.policy)
        .max_retry_after(retry.max_retry_after)
        .user_agent(cfg.user_agent.clone());
    let builder = match cfg.timeout {
        Some(timeout) => builder.timeout(timeout).build(),
        None => builder.build(),
    };

    let sender = if cfg.single_host {
        Sender::Single(builder.client().context("Failed to create request client")?)
    } else {
        Sender::PerHost(
            builder
                .multi_host_client()
                .context("Failed to create request client")?,
        )
    };
    Ok(sender)
}

// Dispatches to the same method on whichever client is in use
macro_rules! dispatch {
    ($sender:expr, $method:ident ( $($arg:expr),* )) => {
        match $sender {
            Sender::Single(client) => client.$method($($arg),*).await,
            Sender::PerHost(client) => client.$method($($arg),*).await,
        }
    };
}

impl Sender {
    /// Send the request(s) described by `command`, one after another.
    ///
    /// Returns each URL with its final response. Stops at the first error.
    pub(crate) async fn send(&self, command: &Command) -> Result<Vec<(String, Response)>> {
        let mut responses = Vec::new();
        match command {
            Command::Get { urls } => {
                for url in urls {
                    let response = dispatch!(self, get(url))
                        .with_context(|| format!("GET {url} failed"))?;
                    responses.push((url.clone(), response));
                }
            }
            Command::Head { urls } => {
                for url in urls {
                    let response = dispatch!(self, head(url))
                        .with_context(|| format!("HEAD {url} failed"))?;
                    responses.push((url.clone(), response));
                }
            }
            Command::Post {
                content_type,
                data,
                url,
            } => {
                let response = dispatch!(self, post(url, content_type, data.clone()))
                    .with_context(|| format!("POST {url} failed"))?;
                responses.push((url.clone(), response));
            }
            Command::PostForm { fields, url } => {
                let response = dispatch!(self, post_form(url, fields))
                    .with_context(|| format!("POST {url} failed"))?;
                responses.push((url.clone(), response));
            }
        }
        Ok(responses)
    }
}
