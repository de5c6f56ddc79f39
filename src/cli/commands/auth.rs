use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_ADMINS: &str = "admins";
pub const ARG_SERVICE_TOKEN: &str = "service-token";
pub const ARG_OTAC_TTL_SECONDS: &str = "otac-ttl-seconds";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub frontend_base_url: String,
    pub admins: Vec<String>,
    pub service_token: SecretString,
    pub otac_ttl_seconds: u64,
    pub session_ttl_seconds: u64,
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_seconds = |id: &str| -> anyhow::Result<u64> {
            matches
                .get_one::<u64>(id)
                .copied()
                .with_context(|| format!("missing required argument: --{id}"))
        };

        let admins = matches
            .get_many::<String>(ARG_ADMINS)
            .map(|values| {
                values
                    .map(|admin| admin.trim().to_string())
                    .filter(|admin| !admin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let service_token = matches
            .get_one::<String>(ARG_SERVICE_TOKEN)
            .map(|token| token.trim().to_string())
            .unwrap_or_default();

        Ok(Self {
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .with_context(|| format!("missing required argument: --{ARG_FRONTEND_BASE_URL}"))?,
            admins,
            service_token: SecretString::from(service_token),
            otac_ttl_seconds: read_seconds(ARG_OTAC_TTL_SECONDS)?,
            session_ttl_seconds: read_seconds(ARG_SESSION_TTL_SECONDS)?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL, used for CORS and the session cookie domain")
                .env("TERRA_FRONTEND_BASE_URL")
                .default_value("http://localhost:10001"),
        )
        .arg(
            Arg::new(ARG_ADMINS)
                .long(ARG_ADMINS)
                .help("Comma separated users granted the Admin tier on login")
                .env("TERRA_ADMINS")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new(ARG_SERVICE_TOKEN)
                .long(ARG_SERVICE_TOKEN)
                .help("Bearer token for trusted services; empty disables bearer access")
                .env("TERRA_SERVICE_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_OTAC_TTL_SECONDS)
                .long(ARG_OTAC_TTL_SECONDS)
                .help("One-time access code TTL in seconds")
                .env("TERRA_OTAC_TTL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("TERRA_SESSION_TTL_SECONDS")
                .default_value("21600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
