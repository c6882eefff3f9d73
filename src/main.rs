mod app;
mod backend;
mod engine;
mod models;
mod scanner;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use app::App;
use backend::LocalBackend;
use models::SettingsStore;
use ui::Terminal;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stderr keeps log lines out of the status output on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mediasort=info".parse()?),
        )
        .init();

    let source = std::env::args().nth(1);
    info!(?source, "Starting mediasort");

    let store = SettingsStore::open_default()?;
    let backend = Arc::new(LocalBackend::new_default()?);
    let mut app = App::new(backend, store, Terminal::stdio())?;
    app.run(source).await;
    Ok(())
}
