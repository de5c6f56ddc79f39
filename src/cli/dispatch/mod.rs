//! Map parsed CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, store, ARG_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(ARG_PORT)
        .copied()
        .context("missing required argument: --port")?;

    let auth_opts = auth::Options::parse(matches)?;
    let store_opts = store::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        frontend_base_url: auth_opts.frontend_base_url,
        admins: auth_opts.admins,
        service_token: auth_opts.service_token,
        otac_ttl_seconds: auth_opts.otac_ttl_seconds,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        redis_url: store_opts.redis_url,
        redis_password: store_opts.redis_password,
        store_timeout_ms: store_opts.timeout_ms,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_flags() -> Result<()> {
        temp_env::with_vars(
            [
                ("TERRA_ADMINS", None::<&str>),
                ("TERRA_SERVICE_TOKEN", None),
                ("TERRA_REDIS_PASSWORD", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec![
                    "terra",
                    "--port",
                    "9000",
                    "--admins",
                    "root",
                    "--service-token",
                    "svc",
                    "--redis-password",
                    "pw",
                ]);

                let Action::Server(args) = handler(&matches)?;
                assert_eq!(args.port, 9000);
                assert_eq!(args.admins, ["root"]);
                assert_eq!(args.service_token.expose_secret(), "svc");
                assert!(args.redis_password.is_some());
                Ok(())
            },
        )
    }
}
