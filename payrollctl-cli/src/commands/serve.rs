//! HTTP server command for the payroll API

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use payrollctl_core::db::create_schema;
use payrollctl_core::PayrollConfig;
use payrollctl_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: [server] bind, else 127.0.0.1:8000)
    #[arg(long, short = 'b', env = "PAYROLLCTL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Don't create the table and indexes on startup
    #[arg(long)]
    pub skip_schema: bool,
}

fn server_config(args: &ServeArgs, config: &PayrollConfig) -> Result<ServerConfig> {
    let bind_addr = match args.bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid [server] bind address: {}", config.server.bind))?,
    };

    Ok(ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
        allowed_origins: config.server.allowed_origins.clone(),
    })
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = PayrollConfig::load()?;
    let server_config = server_config(&args, &config)?;

    tracing::info!("Starting payroll API on {}", server_config.bind_addr);

    let pool = super::connect(args.database_url, &config).await?;

    if !args.skip_schema {
        create_schema(&pool)
            .await
            .context("Failed to create schema")?;
    }

    // Run server (blocks until shutdown)
    run_server(pool, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
