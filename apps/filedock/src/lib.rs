//! Shared setup for the `filedock` and `filedock-server` binaries.

pub mod config;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing_subscriber::EnvFilter;

use filedock_transfer::Framing;

use config::FiledockConfig;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, with `debug` for filedock
/// crates when `debug` is true.
pub fn init_tracing(debug: bool) {
    let default = if debug { "info,filedock=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// End-of-stream framing as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FramingArg {
    Sentinel,
    LengthPrefixed,
}

impl From<FramingArg> for Framing {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Sentinel => Framing::Sentinel,
            FramingArg::LengthPrefixed => Framing::LengthPrefixed,
        }
    }
}

/// Options shared by both binaries. Each one overrides the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Configuration file (default: ~/.config/filedock/config.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Attempts per chunk before a transfer gives up
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Delay between attempts, in milliseconds
    #[arg(long, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// How the end of a file stream is marked; both peers must agree
    #[arg(long, value_enum)]
    pub framing: Option<FramingArg>,

    /// Enable detailed debug output (RUST_LOG overrides this)
    #[arg(short, long)]
    pub debug: bool,
}

impl CommonArgs {
    /// Loads the config file and applies the overrides given on the
    /// command line.
    pub fn load_config(&self) -> anyhow::Result<FiledockConfig> {
        let mut config = FiledockConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut FiledockConfig) {
        if let Some(n) = self.max_retries {
            config.max_retries = n;
        }
        if let Some(ms) = self.retry_delay_ms {
            config.retry_delay_ms = ms;
        }
        if let Some(framing) = self.framing {
            config.framing = framing.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "filedock",
            "--max-retries",
            "7",
            "--framing",
            "length-prefixed",
        ]);
        let mut config = FiledockConfig::default();
        cli.common.apply(&mut config);

        assert_eq!(config.max_retries, 7);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.framing, Framing::LengthPrefixed);
    }

    #[test]
    fn no_flags_leave_config_alone() {
        let cli = Cli::parse_from(["filedock"]);
        let mut config = FiledockConfig::default();
        cli.common.apply(&mut config);
        assert_eq!(config, FiledockConfig::default());
    }

    #[test]
    fn unknown_framing_is_rejected() {
        assert!(Cli::try_parse_from(["filedock", "--framing", "morse"]).is_err());
    }
}
