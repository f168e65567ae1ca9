//! `tutorctl serve`: run the HTTP API against Postgres

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use tutorctl_server::db::pool::{create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
use tutorctl_server::db::{schema, PgStore};
use tutorctl_server::http::{run_server, ServerConfig};

use crate::config::TutorConfig;

const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
    8080,
);

/// Arguments for the serve command
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[arg(long, short = 'b', env = "TUTORCTL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Do not create missing tables at startup
    #[arg(long)]
    pub skip_schema: bool,
}

/// Effective server settings after layering flags, env and config file
#[derive(Debug, Clone, PartialEq)]
pub struct ServeSettings {
    pub bind: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    pub request_timeout: Duration,
    pub cors_permissive: bool,
}

impl ServeSettings {
    pub fn resolve(args: &ServeArgs, file: &TutorConfig) -> Result<Self> {
        let server = &file.server;

        let database_url = args
            .database_url
            .clone()
            .or_else(|| server.database_url.clone())
            .context(
                "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env, \
                 or [server].database_url in ~/.tutorctl/config.toml",
            )?;

        let timeout_secs = args
            .request_timeout
            .or(server.request_timeout_secs)
            .unwrap_or(ServerConfig::default().request_timeout.as_secs());

        Ok(Self {
            bind: args.bind.or(server.bind).unwrap_or(DEFAULT_BIND),
            database_url,
            max_connections: args
                .max_connections
                .or(server.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            request_timeout: Duration::from_secs(timeout_secs),
            cors_permissive: args.cors_permissive || server.cors_permissive.unwrap_or(false),
        })
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            request_timeout: self.request_timeout,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let file = TutorConfig::load()?;
    let settings = ServeSettings::resolve(&args, &file)?;

    tracing::info!(
        bind = %settings.bind,
        max_connections = settings.max_connections,
        timeout_secs = settings.request_timeout.as_secs(),
        "Starting tutorctl server"
    );

    let pool = create_pool_with_options(&settings.database_url, settings.max_connections)
        .await
        .context("Failed to create database pool")?;

    if !args.skip_schema {
        schema::apply(&pool)
            .await
            .context("Failed to apply database schema")?;
    }

    // Run server (blocks until shutdown)
    run_server(PgStore::new(pool), settings.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
