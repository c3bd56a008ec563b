//! Dialog converter CLI entry point.

mod cli;

use std::path::Path;

use clap::Parser;
use cli::{Cli, Command};
use dialog_conversion::errors::{Error, Result};
use dialog_conversion::{convert_dialogs, document, find_legacy_dialogs};
use dialog_rewrite::{FailurePolicy, RewriteEngine, builtin_rules};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Convert {
            input,
            output,
            path,
            max_rewrites,
            keep_partial,
            print,
        } => {
            let policy = if keep_partial {
                FailurePolicy::KeepPartial
            } else {
                FailurePolicy::Rollback
            };
            let engine = RewriteEngine::new(builtin_rules())
                .with_max_rewrites(max_rewrites)
                .with_failure_policy(policy);
            convert_file(&engine, &input, output.as_deref(), &path, print)
        }
        Command::List { input, path } => list_file(&input, &path),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns whether every dialog was converted.
fn convert_file(
    engine: &RewriteEngine,
    input: &Path,
    output: Option<&Path>,
    path: &str,
    print: bool,
) -> Result<bool> {
    let mut tree = document::load(input)?;
    let reports = convert_dialogs(engine, &mut tree, path)?;

    for report in &reports {
        match &report.result {
            Ok(outcome) => eprintln!(
                "converted {} -> {}",
                report.path,
                tree.path(outcome.root)
            ),
            Err(err) => eprintln!("failed    {}: {err}", report.path),
        }
    }
    if print {
        eprint!("{tree}");
    }

    match output {
        Some(output) => document::save(&tree, output)?,
        None => println!("{}", document::to_json_string(&tree)?),
    }
    Ok(reports.iter().all(|r| r.is_success()))
}

fn list_file(input: &Path, path: &str) -> Result<bool> {
    let tree = document::load(input)?;
    let start = tree
        .resolve(path)
        .ok_or_else(|| Error::PathNotFound(path.to_owned()))?;
    for dialog in find_legacy_dialogs(&tree, start) {
        println!("{}", tree.path(dialog));
    }
    Ok(true)
}
