use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[command(flatten)]
    pub verbose: Verbosity,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        name = "check",
        about = "Validate the front matter of every collection. [default]"
    )]
    Check(CheckArgs),
    #[command(name = "list", about = "Print validated entries as JSON, newest first.")]
    List(ListArgs),
    #[command(name = "new", about = "Create a new draft log entry.")]
    New(NewArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the project directory.
    #[clap(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Path to the project directory.
    #[clap(default_value = ".")]
    pub path: PathBuf,
    /// Collection to list.
    #[clap(short, long, default_value = "log")]
    pub collection: String,
    /// Include draft entries.
    #[clap(short, long, action)]
    pub drafts: bool,
}

#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Title of the entry, also used for the file name.
    #[clap()]
    pub title: String,
    #[clap(short, long, default_value = "")]
    pub description: String,
    /// Tag to add, can be repeated.
    #[clap(short, long = "tag")]
    pub tags: Vec<String>,
    /// Path to the project directory.
    #[clap(short, long, default_value = ".")]
    pub path: PathBuf,
    /// By default an existing entry with the same file name is an error. Use this flag to
    /// overwrite it.
    #[clap(short, long, action)]
    pub force: bool,
}
