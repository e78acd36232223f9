//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generate Sphinx reference stubs from a module namespace
#[derive(Parser, Debug)]
#[command(name = "autoref")]
#[command(about = "Generate Sphinx reference stubs from a module namespace")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write stub pages and the quick-reference index
    Generate {
        /// Namespace source: manifest (.json), stub file (.py/.pyi) or package directory
        source: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root module name (defaults to the source's name)
        #[arg(long)]
        module: Option<String>,

        /// Glob patterns over qualified names to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Directory of custom *.tera templates
        #[arg(long)]
        templates: Option<PathBuf>,
    },

    /// Print the classification without writing any files
    Classify {
        /// Namespace source: manifest (.json), stub file (.py/.pyi) or package directory
        source: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root module name (defaults to the source's name)
        #[arg(long)]
        module: Option<String>,

        /// Glob patterns over qualified names to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// Show version information
    Version,
}

/// Output format of `classify`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Text,
    Json,
}
