//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    commands::{build, clean},
    project::DEFAULT_PROJECT_FILE,
};

#[derive(Parser)]
#[command(name = "iconsmith")]
#[command(about = "Build icon fonts, stylesheets and demo pages from SVG glyphs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ProjectArgs {
    /// Project file with `[defaults]` and `[targets.<name>]` tables
    #[arg(short, long, default_value = DEFAULT_PROJECT_FILE)]
    pub config: PathBuf,
    /// Cache root; defaults to `.iconsmith-cache` next to the project file
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
    /// Targets to process; all when omitted
    pub targets: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build targets, skipping those whose inputs and outputs are unchanged
    Build {
        #[command(flatten)]
        project: ProjectArgs,
        /// Always rebuild and do not record fingerprints
        #[arg(long)]
        no_cache: bool,
        /// Targets built concurrently
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Remove generated files and cached fingerprints of targets
    Clean {
        #[command(flatten)]
        project: ProjectArgs,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { project, no_cache, jobs } => {
                build(&project, no_cache, jobs)?;
            }
            Commands::Clean { project } => {
                clean(&project)?;
            }
        }
        Ok(())
    }
}
