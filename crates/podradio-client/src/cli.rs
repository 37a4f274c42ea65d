//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ClientConfig, TransportKind};

/// podradio-ctl - control a PodRadio player over Bluetooth
#[derive(Debug, Parser)]
#[command(name = "podradio-ctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "PODRADIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    // --- Connection flags ---
    /// Device address to connect to instead of [device] address
    #[arg(long, short, env = "PODRADIO_ADDRESS")]
    pub address: Option<String>,

    /// Service channel, or TCP port with --transport tcp
    #[arg(long)]
    pub channel: Option<u16>,

    /// Stream kind used to reach the service
    #[arg(long, value_enum)]
    pub transport: Option<TransportKind>,

    /// Read timeout in seconds (0 blocks indefinitely)
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies command line overrides on top of the file configuration.
    ///
    /// `--address` is not folded in; it is passed to the resolver as the
    /// explicit connection target.
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(channel) = self.channel {
            config.device.channel = channel;
        }
        if let Some(transport) = self.transport {
            config.connection.transport = transport;
        }
        if let Some(timeout) = self.timeout {
            config.connection.read_timeout_secs = Some(timeout);
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show player and selection status
    Status,

    /// List subscribed podcasts
    List,

    /// Subscribe to a podcast feed
    Add {
        /// Podcast name
        name: String,

        /// RSS feed URL
        url: String,

        /// Optional description
        #[arg(long, short, default_value = "")]
        description: String,
    },

    /// Unsubscribe from a podcast by name or URL
    Remove {
        /// Podcast name or feed URL
        identifier: String,
    },

    /// Play the selected podcast, or an audio URL
    Play {
        /// Audio URL to play instead of the selected podcast
        #[arg(long)]
        url: Option<String>,
    },

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Select the next podcast
    Next,

    /// Select the previous podcast
    #[command(alias = "prev")]
    Previous,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file path
    Path,
}
