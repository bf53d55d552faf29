//! Command-line driver for creating, checking, and inspecting IL4IL module files.

use clap::Parser;
use il4il_core::validate::{ValidModule, ValidationRules};
use il4il_core::{Ident, Metadata, Module};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "il4il")]
#[command(about = "IL4IL module toolchain", long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Create a module file
    New {
        /// Output file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Name to record in the module's metadata
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Decode and validate a module file
    Check {
        /// Module file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Accept modules declaring more than one name
        #[arg(long)]
        allow_multiple_names: bool,
    },

    /// Print a module's version and metadata
    Info {
        /// Module file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Accept modules declaring more than one name
        #[arg(long)]
        allow_multiple_names: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();

    match args.command {
        Command::New { file, name } => new_module(&file, name.as_deref()),
        Command::Check {
            file,
            allow_multiple_names,
        } => check_module(&file, allow_multiple_names).map(|valid| {
            println!(
                "ok: {} (format {}, {} metadata entries)",
                file.display(),
                valid.version(),
                valid.metadata_count()
            );
        }),
        Command::Info {
            file,
            allow_multiple_names,
        } => info(&file, allow_multiple_names),
    }
}

fn new_module(file: &std::path::Path, name: Option<&str>) -> Result<()> {
    let mut module = Module::new();
    if let Some(text) = name {
        let ident = Ident::new(text.to_owned())?;
        module.add_metadata_name(ident);
    }

    module.write_to_path(file).into_diagnostic()?;
    log::info!("wrote {}", file.display());
    Ok(())
}

fn check_module(file: &std::path::Path, allow_multiple_names: bool) -> Result<ValidModule> {
    let module = Module::read_from_path(file)?;
    let rules = ValidationRules {
        allow_multiple_names,
    };
    Ok(ValidModule::validate(module, &rules)?)
}

fn info(file: &std::path::Path, allow_multiple_names: bool) -> Result<()> {
    let valid = check_module(file, allow_multiple_names)?;

    println!("format version: {}", valid.version());
    println!("metadata entries: {}", valid.metadata_count());
    for (index, entry) in valid.metadata_entries().iter().enumerate() {
        match entry {
            Metadata::Name(name) => println!("  [{index}] name: {name}"),
            other => println!("  [{index}] {:?}", other.kind()),
        }
    }

    Ok(())
}
