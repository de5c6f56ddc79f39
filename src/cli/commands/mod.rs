pub mod auth;
pub mod logging;
pub mod store;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("terra")
        .about("One-time access codes, sessions and tiered authorization")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("10000")
                .env("TERRA_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = auth::with_args(command);
    let command = store::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 11] = [
        "TERRA_PORT",
        "TERRA_FRONTEND_BASE_URL",
        "TERRA_ADMINS",
        "TERRA_SERVICE_TOKEN",
        "TERRA_OTAC_TTL_SECONDS",
        "TERRA_SESSION_TTL_SECONDS",
        "TERRA_REDIS_URL",
        "TERRA_REDIS_PASSWORD",
        "TERRA_STORE_TIMEOUT_MS",
        "TERRA_LOG_LEVEL",
        "RUST_LOG",
    ];

    fn env_with(
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, Option<&'static str>)> {
        ENV_VARS
            .iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| *value);
                (*name, value)
            })
            .collect()
    }

    fn clean_env() -> Vec<(&'static str, Option<&'static str>)> {
        env_with(&[])
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "terra");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("One-time access codes, sessions and tiered authorization".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_default() {
        temp_env::with_vars(clean_env(), || {
            let matches = new().get_matches_from(vec!["terra"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(10000));
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(0)
            );
        });
    }

    #[test]
    fn test_check_flags() {
        temp_env::with_vars(clean_env(), || {
            let matches = new().get_matches_from(vec![
                "terra",
                "--port",
                "8080",
                "--frontend-base-url",
                "https://terra.example.com",
                "--redis-url",
                "redis://cache:6379/1",
                "--service-token",
                "svc",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches
                    .get_one::<String>(auth::ARG_FRONTEND_BASE_URL)
                    .cloned(),
                Some("https://terra.example.com".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(store::ARG_REDIS_URL).cloned(),
                Some("redis://cache:6379/1".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(auth::ARG_SERVICE_TOKEN).cloned(),
                Some("svc".to_string())
            );
        });
    }

    #[test]
    fn test_check_env() {
        let vars = env_with(&[
            ("TERRA_PORT", "443"),
            ("TERRA_FRONTEND_BASE_URL", "https://terra.example.com"),
            ("TERRA_REDIS_URL", "redis://cache:6379"),
            ("TERRA_LOG_LEVEL", "info"),
        ]);

        temp_env::with_vars(vars, || {
            let matches = new().get_matches_from(vec!["terra"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
            assert_eq!(
                matches
                    .get_one::<String>(auth::ARG_FRONTEND_BASE_URL)
                    .cloned(),
                Some("https://terra.example.com".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(store::ARG_REDIS_URL).cloned(),
                Some("redis://cache:6379".to_string())
            );
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(2)
            );
        });
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(env_with(&[("TERRA_LOG_LEVEL", level)]), || {
                let matches = new().get_matches_from(vec!["terra"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars(clean_env(), || {
                let mut args = vec!["terra".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
