//! CLI argument parsing using clap.

use bootpack_core::LaunchConfig;
use bootpack_core::PackagingFormat;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the nested search path in precedence order
    List(ListArgs),
    /// Check that every nested archive opens and the entry point resolves
    Verify(VerifyArgs),
    /// Show which search-path element supplies a name
    Resolve(ResolveArgs),
    /// Show the launch metadata
    Manifest(ManifestArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by commands that build a search path.
#[derive(clap::Args)]
pub struct LayoutArgs {
    /// Force a layout instead of reading it from the metadata (jar, war)
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<PackagingFormat>,
}

impl LayoutArgs {
    pub fn config(&self) -> LaunchConfig {
        match self.layout {
            Some(layout) => LaunchConfig::default().with_layout(layout),
            None => LaunchConfig::default(),
        }
    }
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the packaged archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the packaged archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Also read every entry of every nested archive
    #[arg(long)]
    pub deep: bool,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(clap::Args)]
pub struct ResolveArgs {
    /// Path to the packaged archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Resource name, or a dotted module identifier with --module
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Treat NAME as a module identifier such as com.example.App
    #[arg(short, long)]
    pub module: bool,

    /// Write the resolved bytes to stdout instead of a summary
    #[arg(short, long)]
    pub print: bool,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(clap::Args)]
pub struct ManifestArgs {
    /// Path to the packaged archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}
