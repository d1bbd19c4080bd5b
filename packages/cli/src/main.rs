mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{get, init, remove, set, show, GetArgs, InitArgs, RemoveArgs, SetArgs, ShowArgs};
use std::path::PathBuf;

/// xdyn - read and edit XML files through member paths
#[derive(Parser, Debug)]
#[command(name = "xdyn")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Projection settings (defaults to ./xdynamic.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default xdynamic.config.json
    Init(InitArgs),

    /// Print the value at a member path
    Get(GetArgs),

    /// Assign a value at a member path and save the file
    Set(SetArgs),

    /// Remove the member at a path and save the file
    Remove(RemoveArgs),

    /// Pretty-print a file, or the object at a member path
    Show(ShowArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let config = cli.config.as_deref();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Get(args) => get(args, &cwd, config),
                Command::Set(args) => set(args, &cwd, config),
                Command::Remove(args) => remove(args, &cwd, config),
                Command::Show(args) => show(args, &cwd, config),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
