use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "parley")]
#[command(bin_name = "parley")]
#[command(about = "Talk to a Parley bot from the terminal", long_about = None)]
pub struct ParleyCli {
    /// Bot configuration file. Defaults to the bundled ticket bot.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bot to talk to.
    #[arg(short, long, default_value = "default")]
    pub bot: String,

    /// Who is talking.
    #[arg(short, long, default_value = "me")]
    pub user: String,

    /// Used when `RUST_LOG` is not set.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
