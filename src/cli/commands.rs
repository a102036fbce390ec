use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_BIND, DEFAULT_DATABASE};

#[derive(Parser, Debug)]
#[command(name = "notekeeper")]
#[command(version, about = "A REST service for notes with automatic timestamps")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, env = "NOTEKEEPER_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// SQLite database file (created if missing)
        #[arg(long, env = "NOTEKEEPER_DATABASE", default_value = DEFAULT_DATABASE)]
        database: PathBuf,
    },

    /// Create or upgrade the database schema and exit
    Migrate {
        /// SQLite database file (created if missing)
        #[arg(long, env = "NOTEKEEPER_DATABASE", default_value = DEFAULT_DATABASE)]
        database: PathBuf,
    },
}
