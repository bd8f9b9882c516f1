//! sproxy command-line tool
//!
//! Reads proxy declaration files and writes class files, Java stubs or JSON
//! summaries; `inspect` decodes and verifies an existing class file.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sproxy")]
#[command(about = "Static proxy class generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit class files from declaration files
    Emit {
        /// Declaration files or directories
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = "build/classes")]
        out_dir: PathBuf,
        /// Rewrite outputs even when unchanged
        #[arg(short, long)]
        force: bool,
    },

    /// Write Java source stubs
    Java {
        /// Declaration files or directories
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output directory; stubs go to stdout when absent
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Print JSON summaries of the declared classes
    Json {
        /// Declaration files or directories
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Decode, verify and disassemble a class file
    Inspect {
        /// Class file
        file: PathBuf,
        /// Skip bytecode listings
        #[arg(long)]
        no_code: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Emit {
            files,
            out_dir,
            force,
        } => commands::emit::execute(&files, &out_dir, force),
        Commands::Java { files, out_dir } => commands::java::execute(&files, out_dir.as_deref()),
        Commands::Json { files } => commands::json::execute(&files),
        Commands::Inspect { file, no_code } => commands::inspect::execute(&file, !no_code),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
