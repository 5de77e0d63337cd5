//! claw-dash - Clawbernetes dashboard API server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use claw_dash::{DashConfig, DashServer, DashState, LocalContent, NavigationPolicy, RegistryBuilder};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "claw-dash")]
#[command(about = "Clawbernetes dashboard API server")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, env = "CLAW_DASH_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "CLAW_DASH_BIND")]
    bind: Option<SocketAddr>,

    /// Path prefix for the API routes
    #[arg(long, env = "CLAW_DASH_API_PREFIX")]
    api_prefix: Option<String>,

    /// Directory of JSON documents to serve as local content
    #[arg(long, env = "CLAW_DASH_LOCAL_CONTENT")]
    local_content: Option<PathBuf>,

    /// How navigation treats a failing module
    #[arg(long, value_enum)]
    navigation_policy: Option<PolicyArg>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    FailFast,
    SkipFailed,
}

impl From<PolicyArg> for NavigationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FailFast => Self::FailFast,
            PolicyArg::SkipFailed => Self::SkipFailed,
        }
    }
}

impl Cli {
    fn into_config(self) -> anyhow::Result<DashConfig> {
        let mut config = match &self.config {
            Some(path) => DashConfig::load(path)?,
            None => DashConfig::default(),
        };

        if let Some(bind) = self.bind {
            config = config.with_bind_addr(bind);
        }
        if let Some(prefix) = self.api_prefix {
            config = config.with_api_prefix(prefix);
        }
        if let Some(dir) = self.local_content {
            config = config.with_local_content_dir(dir);
        }
        if let Some(policy) = self.navigation_policy {
            config = config.with_navigation_policy(policy.into());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("claw_dash=info,tower_http=info"));
    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    let config = cli.into_config()?;

    let mut builder = RegistryBuilder::new();
    if let Some(dir) = &config.local_content_dir {
        builder
            .register(Arc::new(LocalContent::new(dir)))
            .context("registering local content module")?;
    }
    let registry = builder.build();

    info!(
        bind = %config.bind_addr,
        modules = registry.len(),
        policy = ?config.navigation_policy,
        "starting claw-dash"
    );

    let bind_addr = config.bind_addr;
    let server = DashServer::new(DashState::new(config, registry));
    server
        .serve_with_shutdown(bind_addr, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
