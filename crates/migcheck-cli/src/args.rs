//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "migcheck")]
#[command(author, version, about = "Static consistency checker for SQL migration files")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check schema files for structural consistency
    Check {
        /// Schema files to check (supports glob patterns)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Path to a configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Rule codes to disable (e.g. E0002)
        #[arg(long, value_name = "CODE")]
        disable: Vec<String>,
    },

    /// Display the structural model parsed from schema files
    Schema {
        /// Schema files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}
