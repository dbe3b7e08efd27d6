//! CEV CLI Library
//!
//! Command-line client for the Chemical Equipment Visualizer service.
//!
//! # Overview
//!
//! - **Session**: log in, register, log out (`cev login/register/logout`)
//! - **Dashboard**: every dataset with list rollups (`cev list`)
//! - **Dataset detail**: stat cards, type charts, parameter comparison and
//!   the equipment table (`cev show`, `cev summary`)
//! - **Upload**: send a CSV and open the new dataset (`cev upload`)
//! - **Reports**: download the generated PDF (`cev report`)
//! - **Configuration**: manage CLI settings (`cev config`)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod routes;
pub mod session;
pub mod state;
pub mod upload;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use error::{CliError, Result};

use cev_common::types::DatasetId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const UPLOAD_HELP: &str = "\
The file must be a CSV with the columns:
  Equipment Name, Type, Flowrate, Pressure, Temperature
Maximum file size is 5 MB. The server checks both.";

/// CEV - Chemical Equipment Visualizer client
#[derive(Parser, Debug)]
#[command(name = "cev")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL (overrides config file and CEV_SERVER_URL)
    #[arg(long, global = true)]
    pub server_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in to the server
    Login {
        #[arg(short, long)]
        username: Option<String>,

        /// Password (prompted for when omitted)
        #[arg(short, long, env = "CEV_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and log in with it
    Register {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Password (prompted for when omitted)
        #[arg(short, long, env = "CEV_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Password confirmation (defaults to --password when that is given)
        #[arg(long)]
        password_confirm: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Output format
        #[arg(short, long, default_value = "table", value_parser = commands::OUTPUT_FORMATS)]
        format: String,
    },

    /// List datasets (dashboard)
    List {
        /// Output format
        #[arg(short, long, default_value = "table", value_parser = commands::OUTPUT_FORMATS)]
        format: String,
    },

    /// Show one dataset with charts and its equipment table
    Show {
        id: DatasetId,

        /// Output format
        #[arg(short, long, default_value = "table", value_parser = commands::OUTPUT_FORMATS)]
        format: String,
    },

    /// Show min/average/max statistics of one dataset
    Summary {
        id: DatasetId,

        /// Output format
        #[arg(short, long, default_value = "table", value_parser = commands::OUTPUT_FORMATS)]
        format: String,
    },

    /// Upload a CSV dataset
    #[command(after_help = UPLOAD_HELP)]
    Upload {
        /// CSV file to upload
        file: PathBuf,

        /// Dataset name (defaults to the file name without extension)
        #[arg(short, long)]
        name: Option<String>,

        /// Only accept files ending in .csv, like a drag-and-drop selection
        #[arg(long)]
        dropped: bool,

        /// Do not open the dataset after uploading
        #[arg(long)]
        no_open: bool,
    },

    /// Download the PDF report of a dataset
    Report {
        id: DatasetId,

        /// Directory to save into (defaults to the configured report_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Delete a dataset
    Delete {
        id: DatasetId,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Show all configuration
    Show,
}
