use crate::{
    api,
    auth::{AuthConfig, AuthorizationManager, RedisStore},
    cli::telemetry,
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub frontend_base_url: String,
    pub admins: Vec<String>,
    pub service_token: SecretString,
    pub otac_ttl_seconds: u64,
    pub session_ttl_seconds: u64,
    pub redis_url: String,
    pub redis_password: Option<SecretString>,
    pub store_timeout_ms: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the backend is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let redis_url = redis_url(&args.redis_url, args.redis_password.as_ref())?;
    let store = RedisStore::connect(
        redis_url.expose_secret(),
        Duration::from_millis(args.store_timeout_ms),
    )
    .await
    .context("Failed to connect to Redis")?;

    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_admins(args.admins)
        .with_service_token(args.service_token)
        .with_otac_ttl_seconds(args.otac_ttl_seconds)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    if !auth_config.service_token_enabled() {
        warn!("No service token configured, bearer access is disabled");
    }

    debug!("Auth config: {:?}", auth_config);
    info!("{} admin(s) configured", auth_config.admins().len());

    let manager = Arc::new(AuthorizationManager::new(Arc::new(store), auth_config));

    let result = api::new(args.port, manager).await;

    telemetry::shutdown_tracer();

    result
}

/// Inject the password into the connection URL.
fn redis_url(raw: &str, password: Option<&SecretString>) -> Result<SecretString> {
    let mut url = Url::parse(raw).with_context(|| format!("Invalid Redis URL: {raw}"))?;

    if let Some(password) = password {
        url.set_password(Some(password.expose_secret()))
            .map_err(|()| anyhow!("Error setting Redis password"))?;
    }

    Ok(SecretString::from(url.to_string()))
}
