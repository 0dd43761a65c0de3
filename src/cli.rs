use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse Bundler Gemfile.lock files and inspect their dependency graph
#[derive(Parser, Debug)]
#[command(name = "gemlock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ~/.config/gemlock/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Parse a lockfile and print its sources, platforms and dependencies
    Parse {
        /// Lockfile to parse (default: nearest Gemfile.lock)
        path: Option<PathBuf>,
    },
    /// Show the resolved version of a gem
    Find {
        /// Gem name (case-insensitive)
        gem: String,
        /// Lockfile to read (default: nearest Gemfile.lock)
        #[arg(long, value_name = "PATH")]
        lockfile: Option<PathBuf>,
    },
    /// List the gems named in the DEPENDENCIES section
    Deps {
        /// Lockfile to read (default: nearest Gemfile.lock)
        path: Option<PathBuf>,
    },
    /// List resolved gems that depend on a gem
    Uses {
        /// Gem name (case-insensitive)
        gem: String,
        /// Lockfile to read (default: nearest Gemfile.lock)
        #[arg(long, value_name = "PATH")]
        lockfile: Option<PathBuf>,
    },
    /// Parse several lockfiles, reporting every failure instead of stopping at the first
    Check {
        /// Lockfiles to check (default: `watch` from the config file)
        paths: Vec<PathBuf>,
    },
}
