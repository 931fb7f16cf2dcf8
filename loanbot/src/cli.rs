use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "loanbot", version, about = "Terminal loan eligibility advisor")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
    /// Decision service base URL; overrides `server_url` in the config file.
    #[arg(long)]
    pub server: Option<String>,
    /// Config file; defaults to `$XDG_CONFIG_HOME/loanbot/config.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Screen shown at startup.
    #[arg(long, value_enum, default_value_t = StartScreen::Chat)]
    pub screen: StartScreen,
    /// Mirror log output to stderr in addition to the log file.
    #[arg(long, default_value_t = false)]
    pub log_to_stderr: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Prompt for a password and print its bcrypt hash for `[admin] password_hash`.
    HashPassword,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartScreen {
    Chat,
    Admin,
}
