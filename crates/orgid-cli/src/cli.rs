use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "orgid",
    about = "ORGiD graph indexer: replay ledger events into an organization graph",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level regardless of config and RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a recorded fixture into an in-memory graph
    Replay(ReplayArgs),
    /// Derive the content id of a document hash
    Cid(CidArgs),
    /// Validate a profile document
    Profile(ProfileArgs),
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Fixture JSON with events, view responses and documents
    #[arg(long)]
    pub fixture: PathBuf,
    /// Indexer config (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory of pinned documents named by CID, instead of the fixture's
    #[arg(long, conflicts_with = "gateway")]
    pub documents: Option<PathBuf>,
    /// Fetch documents from the IPFS gateway in the config
    #[arg(long)]
    pub gateway: bool,
    /// Write the resulting graph snapshot here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CidArgs {
    /// 32-byte document hash, hex encoded
    pub hash: String,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Document to validate
    pub path: PathBuf,
    #[arg(long, default_value = "legal-entity")]
    pub kind: ProfileKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ProfileKind {
    LegalEntity,
    Unit,
}
