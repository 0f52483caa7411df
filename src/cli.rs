use std::net::SocketAddr;

use clap::Parser;

/// Serve the Project Gutenberg book lookup & analysis page.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Address the page is served on.
    #[arg(long, default_value = "127.0.0.1:5173")]
    pub addr: SocketAddr,

    /// Base URL of the catalog/analysis service (default: $API_HOST_URL).
    #[arg(long)]
    pub api_host_url: Option<String>,

    /// How long a warning stays visible, in milliseconds.
    #[arg(long)]
    pub notification_ttl_ms: Option<u64>,

    /// Give up on a catalog request after this many seconds (default: never).
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}
