//! Command-line arguments.
//!
//! Flags override values from the TOML configuration file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ClientConfig;

/// chunkup - resumable file uploads.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the upload server.
    #[arg(long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Largest file accepted, in bytes.
    #[arg(long = "max-size", value_name = "BYTES", global = true)]
    pub max_size: Option<u64>,

    /// Configuration file. Defaults to the platform config directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Check a file against the size limit without uploading it.
    Check { file: PathBuf },

    /// Upload a file in resumable mode. Reads p/r/a/q commands from stdin.
    Upload { file: PathBuf },

    /// Upload a file in a single multipart request.
    Simple { file: PathBuf },
}

impl Args {
    /// Writes flag values over `config`.
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(max) = self.max_size {
            config.max_file_size = max;
        }
    }
}
