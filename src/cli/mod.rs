pub mod account;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sinigang")]
#[command(about = "Sinigang Social account CLI", long_about = None)]
pub struct Cli {
    /// Path to the TOML config (created with defaults if missing)
    #[arg(long, global = true, default_value = "sinigang.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        handle: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in to an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Follow a profile by handle or id
    Follow {
        target: String,
    },
    /// Unfollow a profile by handle or id
    Unfollow {
        target: String,
    },
    /// List registered profiles
    Accounts,
}
