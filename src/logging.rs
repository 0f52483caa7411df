use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or blank.
pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Installs the stderr subscriber. A malformed `RUST_LOG` is an error rather
/// than a silent fallback.
pub fn init() -> anyhow::Result<()> {
    let raw = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(raw.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

fn build_filter(raw: Option<&str>) -> anyhow::Result<EnvFilter> {
    match raw.map(str::trim).filter(|directives| !directives.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {}={directives:?}", EnvFilter::DEFAULT_ENV)),
        None => EnvFilter::try_new(DEFAULT_FILTER).context("build default log filter"),
    }
}
