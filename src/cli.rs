//! Command-line interface.

use clap::{Parser, Subcommand};

/// Wartrack - warranty tracking for procurement assets
#[derive(Parser)]
#[command(name = "wartrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web service
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Account maintenance
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Rotate an account password without going through the API
    ResetPassword {
        /// Email of the account to update
        email: String,

        /// The new password
        #[arg(long)]
        password: String,
    },
}
