//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use depbuild::builder::BuildVariant;
use depbuild::core::state::DEFAULT_STATE_FILE;
use depbuild::tools::Tool;
use depbuild::util::shell::ColorChoice;

/// depbuild - download, build and install third-party native libraries
#[derive(Parser)]
#[command(name = "depbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Builder state file, relative to the working directory
    #[arg(long, global = true, value_name = "PATH", env = "DEPBUILD_STATE", default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a fresh builder state
    Init(InitArgs),

    /// Download a pinned build tool and record it
    Tool(ToolArgs),

    /// Fetch, build and install one library
    Lib(LibArgs),

    /// Start over, provision both tools and build every library
    All,

    /// Print the builder state
    Show(ShowArgs),

    /// Check the host tools the pipeline relies on
    Doctor,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// C compiler (overrides depbuild.toml and CC)
    #[arg(long, value_name = "CC")]
    pub cc: Option<String>,

    /// C++ compiler (overrides depbuild.toml and CXX)
    #[arg(long, value_name = "CXX")]
    pub cxx: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolKind {
    Cmake,
    Ninja,
}

impl From<ToolKind> for Tool {
    fn from(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Cmake => Tool::CMake,
            ToolKind::Ninja => Tool::Ninja,
        }
    }
}

#[derive(Args)]
pub struct ToolArgs {
    /// Tool to provision
    #[arg(value_enum)]
    pub tool: ToolKind,

    /// Release to download instead of the pinned one
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Args)]
pub struct LibArgs {
    /// Library key (yaml-cpp, sqlpp11, date, sqlpp11-mysql, catch2, boost, cyrus-sasl, qt5base)
    pub library: String,

    /// Version to build instead of the default
    #[arg(long)]
    pub version: Option<String>,

    /// Installation prefix (default: <source>/prefix)
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Build directory (default: <source>/build); boost takes none
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// CMake build type: Release, Debug, RelWithDebInfo, MinSizeRel (CMake libraries only)
    #[arg(long, value_name = "TYPE", default_value = "Release")]
    pub build_type: BuildVariant,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Print the state as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
