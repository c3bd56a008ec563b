//! Command-line interface for the dialog converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dialog-conversion")]
#[command(about = "Converts legacy dialog definitions to the container/content schema", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert every legacy dialog below a path
    Convert {
        /// JSON document to read
        input: PathBuf,

        /// Where to write the converted document (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only convert dialogs below this node
        #[arg(long, default_value = "/")]
        path: String,

        /// Maximum number of rewrites per dialog
        #[arg(long, default_value_t = 1000)]
        max_rewrites: usize,

        /// Keep partially rewritten dialogs instead of rolling them back
        #[arg(long)]
        keep_partial: bool,

        /// Print the converted tree to stderr
        #[arg(long)]
        print: bool,
    },

    /// List the legacy dialogs below a path
    #[command(alias = "ls")]
    List {
        input: PathBuf,

        #[arg(long, default_value = "/")]
        path: String,
    },
}
