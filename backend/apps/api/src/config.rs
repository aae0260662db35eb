//! Server configuration from the environment

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AuthConfig, RuntimeEnv, TokenKeys};
use axum::http::HeaderValue;
use platform::password::HashCost;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9999";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:9999";

#[derive(Debug)]
pub struct ServerConfig {
    pub runtime_env: RuntimeEnv,
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory store (development only)
    pub database_url: Option<String>,
    pub frontend_origins: Vec<HeaderValue>,
    pub auth: AuthConfig,
    pub keys: TokenKeys,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let runtime_env: RuntimeEnv = var("APP_ENV").unwrap_or_default().parse()?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let database_url = var("DATABASE_URL");
        if database_url.is_none() && runtime_env.is_production() {
            bail!("DATABASE_URL must be set in production");
        }

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        let defaults = AuthConfig::for_env(runtime_env);
        let default_cost = HashCost::default();
        let auth = AuthConfig {
            session_ttl: match var("SESSION_TTL_SECS") {
                Some(v) => Duration::from_secs(parse_number("SESSION_TTL_SECS", &v)?),
                None => defaults.session_ttl,
            },
            hash_cost: HashCost {
                memory_kib: parse_or("PASSWORD_HASH_MEMORY_KIB", var, default_cost.memory_kib)?,
                iterations: parse_or("PASSWORD_HASH_ITERATIONS", var, default_cost.iterations)?,
                parallelism: parse_or(
                    "PASSWORD_HASH_PARALLELISM",
                    var,
                    default_cost.parallelism,
                )?,
            },
            hash_workers: parse_or("PASSWORD_HASH_WORKERS", var, defaults.hash_workers)?,
            ..defaults
        };
        auth.validate()?;

        let keys = TokenKeys::load(
            runtime_env,
            lookup("JWT_SIGN_SECRET").as_deref(),
            lookup("JWT_ENC_KEY").as_deref(),
        )?;

        Ok(Self {
            runtime_env,
            bind_addr,
            database_url,
            frontend_origins,
            auth,
            keys,
        })
    }
}

fn parse_number<T>(name: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a number"))
}

fn parse_or<T>(name: &str, var: impl Fn(&str) -> Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(value) => parse_number(name, &value),
        None => Ok(default),
    }
}
