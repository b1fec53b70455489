//! `filedock <host> <port> <put|get|list> [path]`: one command against a
//! filedock server.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};

use filedock_app::{CommonArgs, init_tracing};
use filedock_protocol::{LIST_BEGIN_MARKER, LIST_END_MARKER};
use filedock_session::{FileClient, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Command {
    Put,
    Get,
    List,
}

#[derive(Debug, Parser)]
#[command(version, about = "filedock client")]
struct Cli {
    /// Server hostname or IP address
    host: String,

    /// Server port
    port: u16,

    /// Command to execute
    #[arg(value_enum)]
    command: Command,

    /// File to upload (put) or name to download (get)
    path: Option<PathBuf>,

    /// Directory downloads are written to
    #[arg(long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.debug);

    let mut config = cli.common.load_config().context("failed to load configuration")?;
    if let Some(dir) = cli.download_dir {
        config.download_dir = dir;
    }
    let client = FileClient::new(cli.host, cli.port, config.client_config());

    let result = match (cli.command, cli.path.as_deref()) {
        (Command::Put, Some(path)) => client.put(path).await.map(|upload| {
            println!("File '{}' uploaded successfully.", upload.name);
        }),
        (Command::Get, Some(path)) => {
            let name = path.to_string_lossy();
            client.get(&name).await.map(|download| {
                println!("File '{}' downloaded successfully.", download.name);
            })
        }
        (Command::List, _) => client.list().await.map(|names| {
            println!("{LIST_BEGIN_MARKER}");
            for name in &names {
                println!("{name}");
            }
            println!("{LIST_END_MARKER}");
        }),
        (_, None) => bail!("put and get require a file path"),
    };

    match result {
        Ok(()) => Ok(()),
        Err(SessionError::Rejected(reply)) => {
            println!("Server: {reply}");
            Ok(())
        }
        Err(e @ SessionError::LocalFileMissing(_)) => {
            println!("{e}");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("command failed")),
    }
}
