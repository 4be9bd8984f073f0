//! Portal configuration: defaults, optional TOML file, `PORTAL_*`
//! environment overrides, then CLI flags, in that order of precedence.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "cadastro-portal")]
#[command(about = "Customer portal front end for registration-data lookups")]
#[command(version)]
pub struct Cli {
    /// Bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the upstream registration-data service
    #[arg(long)]
    pub upstream_cadastro_url: Option<String>,

    /// Seed an in-memory demo session and record
    #[arg(long)]
    pub dev: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    pub host: String,
    pub port: u16,
    pub upstream_cadastro_url: Option<String>,
    pub dev_mode: bool,
    pub log_level: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            upstream_cadastro_url: None,
            dev_mode: false,
            log_level: "info".to_string(),
        }
    }
}

impl PortalConfig {
    pub fn load(cli: &Cli) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("dev_mode", defaults.dev_mode)?
            .set_default("log_level", defaults.log_level)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(Environment::with_prefix("PORTAL").try_parsing(true));

        let mut config: PortalConfig = builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        // CLI flags win over file and environment.
        if let Some(host) = &cli.host {
            config.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(url) = &cli.upstream_cadastro_url {
            config.upstream_cadastro_url = Some(url.clone());
        }
        if cli.dev {
            config.dev_mode = true;
        }
        if let Some(level) = &cli.log_level {
            config.log_level = level.clone();
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
