mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::GenerateArgs;
use crate::output::OutputFormat;

/// modgraph - Generate ninja build graphs for Go binaries and script bundles
#[derive(Parser)]
#[command(name = "modgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate the build graph for a blueprint file
  Generate {
    /// Path to the blueprint file
    #[arg(default_value = "modules.json")]
    blueprint: PathBuf,

    /// Source root that module directories are relative to (default: the blueprint's directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory for generated artifacts, relative to the source root
    #[arg(long, env = "MODGRAPH_OUTPUT_DIR", default_value = modgraph_lib::consts::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Path of the ninja manifest, relative to the source root
    #[arg(long, default_value = "build.ninja")]
    ninja: PathBuf,

    /// Give every module its own test log instead of one shared file
    #[arg(long)]
    per_module_test_logs: bool,

    /// File name suffix that marks test sources
    #[arg(long, default_value = modgraph_lib::consts::DEFAULT_TEST_SUFFIX)]
    test_suffix: String,

    /// Do not add a rule that regenerates the manifest
    #[arg(long)]
    no_regenerate: bool,

    /// Print the graph instead of writing the manifest
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// List the registered rules
  Rules {
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Generate {
      blueprint,
      root,
      output_dir,
      ninja,
      per_module_test_logs,
      test_suffix,
      no_regenerate,
      format,
    } => cmd::cmd_generate(&GenerateArgs {
      blueprint,
      root,
      output_dir,
      ninja,
      per_module_test_logs,
      test_suffix,
      regenerate: !no_regenerate,
      format,
    }),
    Commands::Rules { format } => cmd::cmd_rules(format),
  }
}
