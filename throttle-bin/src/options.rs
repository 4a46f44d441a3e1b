use crate::verbosity::Verbosity;
use anyhow::{Context, Result, anyhow};
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};
use strum::VariantNames;
use throttle_lib::{DEFAULT_USER_AGENT, PolicyKind, RetryConfig};

pub(crate) const THROTTLE_CONFIG_FILE: &str = "throttle.toml";

const DEFAULT_MAX_RETRY_AFTER: &str = "720h";

const HELP_MSG_CONFIG_FILE: &str = "Configuration file to use\n\n[default: throttle.toml]";

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            #[allow(clippy::missing_const_for_fn)]
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    max_retry_after: Duration = throttle_lib::DEFAULT_MAX_RETRY_AFTER;
    user_agent: String = DEFAULT_USER_AGENT.to_string();
    verbosity: Verbosity = Verbosity::default();
}

// Copy the config from the config file to the CLI config, if the CLI value is
// the default value
macro_rules! fold_in {
    ($cli:ident , $toml:ident ; $ty:ident { $(..$ignore:ident,)* $( $key:ident : $default:expr, )* } ) => {
        if (false) {
            #[allow(dead_code, unused, clippy::diverging_sub_expression)]
            let _check_fold_in_exhaustivity = $ty {
                $($key: unreachable!(), )*
                $($ignore: unreachable!(), )*
            };
        };
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

/// Send HTTP requests that wait for the server's `Retry-After` and back off
/// on overload.
///
/// Every request goes through a rate limiter. When a server answers with
/// `429 Too Many Requests`, `500 Internal Server Error` or
/// `503 Service Unavailable`, the request is sent again once the server
/// allows it.
#[derive(Parser, Debug)]
#[command(version, about, next_display_order = None)]
pub(crate) struct ThrottleOptions {
    #[command(subcommand)]
    pub(crate) command: Command,

    /// Configuration file to use
    #[arg(short, long = "config", global = true)]
    #[arg(help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) config: Config,
}

/// What to send
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Send a GET request to each URL, one after another
    Get {
        /// URLs to fetch
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Send a HEAD request to each URL, one after another
    Head {
        /// URLs to query
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Send a POST request with a raw body
    Post {
        /// Value of the `Content-Type` header
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,

        /// Request body
        #[arg(short, long, default_value = "")]
        data: String,

        /// URL to post to
        url: String,
    },

    /// Send a POST request with an URL-encoded form body
    PostForm {
        /// Form field as `key=value`; pass multiple times for more fields
        #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// URL to post to
        url: String,
    },
}

/// Parse a form field of the form `key=value`. The value may contain `=`.
fn parse_field(field: &str) -> Result<(String, String)> {
    let (key, value) = field
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid form field `{field}`, expected `key=value`"))?;
    Ok((key.to_string(), value.to_string()))
}

/// The main configuration for throttle
#[derive(Parser, Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Verbose program output
    #[clap(flatten)]
    #[serde(default = "verbosity")]
    pub(crate) verbose: Verbosity,

    /// Policy that decides whether and when to retry
    #[arg(
        long,
        global = true,
        default_value_t,
        value_parser = PossibleValuesParser::new(PolicyKind::VARIANTS)
            .try_map(|s| s.parse::<PolicyKind>()),
    )]
    #[serde(default)]
    pub(crate) policy: PolicyKind,

    /// Give up when the server asks to wait this long or longer, e.g. `30s`
    /// or `1h`
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_MAX_RETRY_AFTER,
        value_parser = humantime::parse_duration,
    )]
    #[serde(default = "max_retry_after", with = "humantime_serde")]
    pub(crate) max_retry_after: Duration,

    /// Share one rate limiter between all hosts instead of one per host
    #[arg(long, global = true)]
    #[serde(default)]
    pub(crate) single_host: bool,

    /// User agent
    #[arg(short, long, global = true, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "user_agent")]
    pub(crate) user_agent: String,

    /// Response timeout per attempt, e.g. `20s`. Waiting for a rate limiter
    /// doesn't count.
    #[arg(short, long, global = true, value_parser = humantime::parse_duration)]
    #[serde(default, with = "humantime_serde")]
    pub(crate) timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &Path) -> Result<Config> {
        // Read configuration file
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| "Failed to parse configuration file")
    }

    /// Merge the configuration from TOML into the CLI configuration
    pub(crate) fn merge(&mut self, toml: Config) {
        fold_in! {
            // Destination and source configs
            self, toml;

            Config {
                // Keys with defaults to assign
                verbose: Verbosity::default(),
                policy: PolicyKind::default(),
                max_retry_after: throttle_lib::DEFAULT_MAX_RETRY_AFTER,
                single_host: false,
                user_agent: DEFAULT_USER_AGENT,
                timeout: None,
            }
        }
    }

    /// The retry settings for the client
    pub(crate) const fn retry(&self) -> RetryConfig {
        RetryConfig {
            policy: self.policy,
            max_retry_after: self.max_retry_after,
        }
    }
}
