use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;

use gutenberg_shelf::app::view::View;
use gutenberg_shelf::catalog::HttpCatalog;
use gutenberg_shelf::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    gutenberg_shelf::logging::init().context("init logging")?;

    let cli = gutenberg_shelf::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = Config::from_env(&cli).context("load config")?;
    tracing::info!(
        api_host_url = %config.api_host_url,
        notification_ttl_ms = config.notification_ttl.as_millis() as u64,
        request_timeout = ?config.request_timeout,
        "starting gutenberg-shelf"
    );

    let catalog = HttpCatalog::new(config.api_host_url.clone(), config.request_timeout)
        .context("build catalog client")?;
    let view = View::new(Arc::new(catalog), config.notification_ttl);

    let listener = tokio::net::TcpListener::bind(cli.addr)
        .await
        .with_context(|| format!("bind {}", cli.addr))?;
    tracing::info!(addr = %cli.addr, "listening");

    view.mount();
    let app = gutenberg_shelf::web::router(view.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    view.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
