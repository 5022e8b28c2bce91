use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use iff_codec::HeaderKind;

mod commands;

/// Environment variable holding the program name written into named-program headers.
const PROGRAM_NAME_VAR: &str = "IFFKIT_PROGRAM_NAME";

#[derive(Parser)]
#[command(name = "iffkit", about = "Inspect, build and unpack IFF-style chunk containers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Kind {
    /// `[name][tag][u64 size]` header
    Named,
    /// `[tag][u32 size]` header
    Classic,
    /// `FAR ` archive
    Far,
}

impl From<Kind> for HeaderKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Named => HeaderKind::NamedProgram,
            Kind::Classic => HeaderKind::Classic,
            Kind::Far => HeaderKind::Archive,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary and the chunk tree of a container.
    Info {
        path: PathBuf,
        /// Parse group chunks (FORM, LIST, ...) into member trees.
        #[arg(long)]
        recursive: bool,
        /// Accept and register unknown form tags.
        #[arg(long)]
        extensible: bool,
    },
    /// Store files as chunks of a new container. Each chunk is named after its file stem.
    Pack {
        out: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "named")]
        kind: Kind,
        #[arg(long, default_value = "FORM")]
        form: String,
        /// Overrides the default program name for this container.
        #[arg(long)]
        program_name: Option<String>,
    },
    /// Write every top-level chunk of a container into a directory.
    Unpack { path: PathBuf, out_dir: PathBuf },
}

#[tokio::main]
pub async fn main() -> color_eyre::Result<()> {
    color_backtrace::install();

    if let Err(v) = dotenv::dotenv() {
        env_logger::init();
        log::warn!("failed to initialise dotenv: {}", v);
    } else {
        env_logger::init();
    }

    if let Ok(name) = std::env::var(PROGRAM_NAME_VAR) {
        iff_codec::config::set_default_program_name(name);
    }

    match Cli::parse().command {
        Command::Info { path, recursive, extensible } => commands::info(&path, recursive, extensible).await,
        Command::Pack { out, files, kind, form, program_name } => commands::pack(&out, &files, kind.into(), &form, program_name).await,
        Command::Unpack { path, out_dir } => commands::unpack(&path, &out_dir).await,
    }
}
