use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mushform",
    version,
    about = "Compile indented MUSH source into softcode and install it"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Path to the defines file (a directory implies defines.json); `off` disables defines"
    )]
    pub defines: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile source files into softcode
    Compile {
        #[arg(help = "Source files or glob patterns, compiled in order")]
        sources: Vec<String>,
        #[arg(short = 'o', long, conflicts_with = "clipboard")]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        clipboard: bool,
        #[arg(short = 'p', long, conflicts_with_all = ["sources", "output", "clipboard"])]
        project: Option<PathBuf>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Manage persistent defines
    Define {
        #[command(subcommand)]
        command: DefineCommands,
    },
    /// Compile (or load) softcode and send it to a server
    Install {
        #[command(flatten)]
        input: InstallInput,
        #[arg(short = 'H', long = "host", help = "Host config (TOML with a [host] table)")]
        host: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(
        short = 'D',
        long = "define",
        value_name = "NAME=VALUE",
        help = "Set a define for this run only"
    )]
    pub overrides: Vec<String>,
    #[arg(
        long = "match",
        value_name = "PATTERN",
        help = "Only keep compiled lines matching this regex at line start"
    )]
    pub match_pattern: Option<String>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InstallInput {
    #[arg(short = 's', long = "source", num_args = 1.., help = "Raw source files to compile")]
    pub sources: Vec<String>,
    #[arg(short = 'c', long = "compiled", num_args = 1.., help = "Already compiled files")]
    pub compiled: Vec<PathBuf>,
    #[arg(short = 'p', long)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum DefineCommands {
    Set { name: String, value: String },
    List,
    Delete { name: String },
}
