use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scim_proxy::{
    config::{Config, LogFormat},
    upstream::client::ReqwestUpstreamClient,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "scim-proxy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A SCIM 2.0 reverse proxy adding filter and extended PATCH support")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address (overrides config file)
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port (overrides config file)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Upstream SCIM base URL (overrides config file)
    #[arg(short = 'u', long, value_name = "URL")]
    upstream_base_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("scim_proxy={},tower_http=trace", cli.log_level)
    } else {
        format!("scim_proxy={}", cli.log_level)
    };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()),
    );

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;

    if config.log_format == LogFormat::Json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("starting scim-proxy v{}", env!("CARGO_PKG_VERSION"));
    info!(config_file = %cli.config, "configuration loaded");

    if let Some(host) = cli.host {
        config.proxy_host = host;
    }
    if let Some(port) = cli.port {
        config.proxy_port = port;
    }
    if let Some(upstream_base_url) = cli.upstream_base_url {
        config.upstream_base_url = upstream_base_url;
    }

    let upstream_url = config.upstream_base_url.parse()?;
    let upstream = Arc::new(ReqwestUpstreamClient::new(
        upstream_url,
        config.upstream_timeout(),
        config.upstream_max_connections,
    )?);
    info!(upstream_base_url = %config.upstream_base_url, "upstream client initialized");

    let web_server = WebServer::new(config, upstream)?;
    web_server.serve().await?;

    Ok(())
}
