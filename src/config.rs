use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::app::view::DEFAULT_NOTIFICATION_TTL;
use crate::cli::Cli;

pub const DEFAULT_API_HOST_URL: &str = "http://localhost:8000";

pub const API_HOST_URL_ENV: &str = "API_HOST_URL";
pub const NOTIFICATION_TTL_ENV: &str = "GUTENBERG_SHELF_NOTIFICATION_TTL_MS";
pub const REQUEST_TIMEOUT_ENV: &str = "GUTENBERG_SHELF_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_host_url: Url,
    pub notification_ttl: Duration,
    /// `None` waits on the catalog indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env(cli: &Cli) -> anyhow::Result<Self> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Flag, then environment, then default. Blank environment values count as unset.
    pub fn resolve(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let env = |key: &str| {
            env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_url = cli
            .api_host_url
            .clone()
            .or_else(|| env(API_HOST_URL_ENV))
            .unwrap_or_else(|| DEFAULT_API_HOST_URL.to_string());
        let api_host_url = parse_api_host_url(&raw_url)
            .with_context(|| format!("invalid api host url {raw_url:?}"))?;

        let notification_ttl = match cli.notification_ttl_ms {
            Some(ms) => Duration::from_millis(ms),
            None => match env(NOTIFICATION_TTL_ENV) {
                Some(raw) => Duration::from_millis(parse_u64(NOTIFICATION_TTL_ENV, &raw)?),
                None => DEFAULT_NOTIFICATION_TTL,
            },
        };
        if notification_ttl.is_zero() {
            anyhow::bail!("notification ttl must be > 0");
        }

        let request_timeout_secs = match cli.request_timeout_secs {
            Some(secs) => Some(secs),
            None => env(REQUEST_TIMEOUT_ENV)
                .map(|raw| parse_u64(REQUEST_TIMEOUT_ENV, &raw))
                .transpose()?,
        };
        let request_timeout = match request_timeout_secs {
            Some(0) => anyhow::bail!("request timeout must be > 0 seconds"),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            api_host_url,
            notification_ttl,
            request_timeout,
        })
    }
}

pub fn parse_api_host_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).context("parse url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("api host url must be http/https");
    }
    if url.host_str().is_none() {
        anyhow::bail!("api host url must include host");
    }
    Ok(url)
}

fn parse_u64(key: &str, raw: &str) -> anyhow::Result<u64> {
    raw.parse::<u64>()
        .with_context(|| format!("invalid {key}={raw:?}. expected a non-negative integer"))
}
