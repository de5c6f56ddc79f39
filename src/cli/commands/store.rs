use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_REDIS_URL: &str = "redis-url";
pub const ARG_REDIS_PASSWORD: &str = "redis-password";
pub const ARG_STORE_TIMEOUT_MS: &str = "store-timeout-ms";

#[derive(Debug, Clone)]
pub struct Options {
    pub redis_url: String,
    pub redis_password: Option<SecretString>,
    pub timeout_ms: u64,
}

impl Options {
    /// Parse key-value backend arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let redis_url = matches
            .get_one::<String>(ARG_REDIS_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("missing required argument: --{ARG_REDIS_URL}"))?;

        // clap passes empty env values through
        let redis_password = matches
            .get_one::<String>(ARG_REDIS_PASSWORD)
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        Ok(Self {
            redis_url,
            redis_password,
            timeout_ms: matches
                .get_one::<u64>(ARG_STORE_TIMEOUT_MS)
                .copied()
                .with_context(|| format!("missing required argument: --{ARG_STORE_TIMEOUT_MS}"))?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_REDIS_URL)
                .long(ARG_REDIS_URL)
                .help("Redis connection URL for codes and sessions")
                .env("TERRA_REDIS_URL")
                .default_value("redis://localhost:6379"),
        )
        .arg(
            Arg::new(ARG_REDIS_PASSWORD)
                .long(ARG_REDIS_PASSWORD)
                .help("Redis password, injected into the connection URL")
                .env("TERRA_REDIS_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_STORE_TIMEOUT_MS)
                .long(ARG_STORE_TIMEOUT_MS)
                .help("Timeout for each key-value backend operation in milliseconds")
                .env("TERRA_STORE_TIMEOUT_MS")
                .default_value("2000")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
