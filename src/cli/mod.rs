//! CLI module - Command-line interface for Volarr
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// Volarr - Volunteer & Event Management Service
#[derive(Parser)]
#[command(name = "volarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web service
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    Init,

    /// Administrative maintenance commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Reset a user's password (reads the new password from stdin)
    ResetPassword {
        /// Username of the account to reset
        username: String,
    },
}
