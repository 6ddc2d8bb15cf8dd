//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::choices::Millistops;
use crate::config::Config;

/// Capture HDR exposure brackets on a gphoto2-controlled camera
#[derive(Parser, Debug)]
#[command(name = "hdr-bracket")]
#[command(version, about = "HDR exposure bracketing through gphoto2", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Three shots one stop apart (0, -1, +1 EV)
    hdr-bracket

    # Five shots two thirds of a stop apart
    hdr-bracket --shots 5 --evstep 700

    # Show which EV steps the camera accepts
    hdr-bracket steps

    # Print the plan without capturing
    hdr-bracket plan -s 9 -e 1000")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Number of shots (default: 3 or from config file)
    #[arg(short, long, global = true, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub shots: Option<u32>,

    /// Exposure compensation on each step, in millistops (1000 = 1 EV)
    #[arg(short, long, global = true, value_name = "N", allow_negative_numbers = true)]
    pub evstep: Option<Millistops>,

    /// Debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// gphoto2 executable (default: gphoto2 on PATH or from config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub gphoto2: Option<PathBuf>,

    /// Compute and log the brackets without capturing
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Apply command-line overrides to a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(gphoto2) = &self.gphoto2 {
            config.camera.gphoto2 = gphoto2.clone();
        }
        if let Some(shots) = self.shots {
            config.bracket.shots = shots;
        }
        if let Some(evstep) = self.evstep {
            config.bracket.ev_step = evstep;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the camera's current exposure settings
    Status,
    /// List the EV steps the camera accepts
    Steps,
    /// Print the bracket plan without capturing
    Plan,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
