//! `filedock-server <port>`: serves put/get/list requests from a storage
//! directory until interrupted.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use filedock_app::{CommonArgs, init_tracing};
use filedock_session::FileServer;

#[derive(Debug, Parser)]
#[command(version, about = "filedock file server")]
struct Cli {
    /// TCP port to listen on
    port: u16,

    /// Directory uploads are stored in
    #[arg(long, value_name = "DIR")]
    storage_dir: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.debug);

    let mut config = cli.common.load_config().context("failed to load configuration")?;
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }

    let server = FileServer::new(config.server_config(cli.port));
    let listener = server
        .bind()
        .await
        .with_context(|| format!("failed to start server on port {}", cli.port))?;
    println!("Server up and running on port {}...", cli.port);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            signal_server.shutdown();
        }
    });

    server.run(listener).await?;
    println!("Server shutting down...");
    Ok(())
}
