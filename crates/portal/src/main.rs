use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use cadastro_portal::cadastro::{DadosCadastraisService, HttpCadastroService, MemoryCadastroService};
use cadastro_portal::config::{Cli, PortalConfig};
use cadastro_portal::server::{seed_dev_data, start_server, AppState};
use cadastro_portal::session::MemorySessionStore;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PortalConfig::load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let sessions = Arc::new(MemorySessionStore::new());

    let cadastro: Arc<dyn DadosCadastraisService> = match &config.upstream_cadastro_url {
        Some(url) => {
            info!("using upstream cadastro service at {url}");
            if config.dev_mode {
                seed_dev_data(&sessions, None);
            }
            Arc::new(HttpCadastroService::new(url.clone()))
        }
        None => {
            let memory = Arc::new(MemoryCadastroService::new());
            if config.dev_mode {
                seed_dev_data(&sessions, Some(&memory));
            }
            memory
        }
    };

    let state = AppState {
        sessions,
        cadastro,
        start_time: Instant::now(),
        req_count: Arc::new(AtomicUsize::new(0)),
        dev_mode: config.dev_mode,
    };

    let addr = config.bind_addr();
    info!("cadastro portal listening on {addr}");
    start_server(state, &addr).await
}
