//! `throttle` sends HTTP requests that honor the server's `Retry-After` header
//! and back off exponentially on overload.
//!
//! The throttle binary is a wrapper around throttle-lib, which provides
//! the rate limited clients.
//!
//! Fetch a page, waiting as long as the server asks for:
//! ```sh
//! throttle get https://example.com/
//! ```
//!
//! Never wait longer than a minute, and only back off exponentially:
//! ```sh
//! throttle --policy exponential_backoff --max-retry-after 1m get https://example.com/
//! ```
//!
//! Submit a form:
//! ```sh
//! throttle post-form -f user=jane -f code=1234 https://example.com/login
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use log::{error, warn};
#[cfg(feature = "native-tls")]
use openssl_sys as _; // required for vendored-openssl feature
use throttle_lib::RetryExt;

use crate::logger::init_logging;
use crate::options::{Config, THROTTLE_CONFIG_FILE, ThrottleOptions};

mod client;
mod logger;
mod options;
mod verbosity;

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator, e.g. when the connection was refused.
    #[allow(unused)]
    UnexpectedFailure = 1,
    /// A server still answered 429, 500 or 503 after the policy gave up
    UnresolvedStatus = 2,
    ConfigFile = 3,
}

fn main() -> Result<()> {
    // std::process::exit doesn't guarantee that all destructors will be run,
    // therefore we wrap the main code in another function to ensure that.
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Merge all provided config options into one.
/// This includes a potential config file and command-line arguments
fn load_config() -> Result<ThrottleOptions> {
    let mut opts = ThrottleOptions::parse();

    init_logging(&opts.config.verbose);

    // Load a potentially existing config file and merge it into the config from
    // the CLI
    if let Some(config_file) = &opts.config_file {
        match Config::load_from_file(config_file) {
            Ok(c) => opts.config.merge(c),
            Err(e) => {
                bail!(
                    "Cannot load configuration file `{}`: {e:?}",
                    config_file.display()
                );
            }
        }
    } else {
        // Without an explicit config file, fall back to the default one in the
        // current directory if it exists. An invalid default file is still an
        // error.
        let default_config = PathBuf::from(THROTTLE_CONFIG_FILE);
        if default_config.is_file() {
            match Config::load_from_file(&default_config) {
                Ok(c) => opts.config.merge(c),
                Err(e) => {
                    bail!(
                        "Cannot load default configuration file `{}`: {e:?}",
                        default_config.display()
                    );
                }
            }
        }
    }

    Ok(opts)
}

/// Set up runtime and call throttle entrypoint
fn run_main() -> Result<i32> {
    use std::process::exit;

    let opts = match load_config() {
        Ok(opts) => opts,
        Err(e) => {
            error!("Error while loading config: {e}");
            exit(ExitCode::ConfigFile as i32);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(&opts))
}

/// Send the requests and print one `STATUS URL` line per response
async fn run(opts: &ThrottleOptions) -> Result<i32> {
    let sender = client::create(&opts.config)?;
    let responses = sender.send(&opts.command).await?;

    let mut exit_code = ExitCode::Success;
    for (url, response) in &responses {
        let status = response.status();
        println!("{} {url}", status.as_u16());

        if status.should_retry() {
            warn!("{url} still answers {status}, giving up");
            exit_code = ExitCode::UnresolvedStatus;
        }
    }

    Ok(exit_code as i32)
}
