use anyhow::Context;
use clap::Parser;
use dotedit_core::config::AppConfig;
use dotedit_server::state::AppState;
use session::SessionStore;
use std::path::PathBuf;
use tracing::info;

/// Browser-based editor for Graphviz DOT files.
#[derive(Debug, Parser)]
#[command(name = "dotedit")]
struct Cli {
    /// DOT file to edit
    #[arg(short, long)]
    file: PathBuf,

    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Session work directory (overrides config)
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotedit_core::init_tracing();
    let cli = Cli::parse();

    let cfg = AppConfig::load().context("loading configuration")?;
    let host = cli.host.unwrap_or(cfg.server.host);
    let port = cli.port.unwrap_or(cfg.server.port);
    let work_dir = cli
        .work_dir
        .unwrap_or_else(|| PathBuf::from(cfg.store.work_dir));

    let store = SessionStore::new(work_dir)?;
    let sessionid = store
        .create(&cli.file)
        .with_context(|| format!("binding {}", cli.file.display()))?;

    let state = AppState::new(store);
    let app = dotedit_server::router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        "editing {} at http://{}/?sessionid={}",
        cli.file.display(),
        addr,
        sessionid
    );

    axum::serve(listener, app).await?;
    Ok(())
}
