//! EC-Admin: Email-Consensus operator tool
//!
//! Offline commands over the protocol core and the local ledger. Nothing
//! here talks to the mail transport or the canonical store.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ec_07_session::SessionConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// EC-Admin: Email-Consensus operator tool
#[derive(Parser, Debug)]
#[command(name = "ec-admin")]
#[command(about = "Offline proposal, ballot and ledger commands")]
struct Args {
    /// Ledger file (overrides EC_LEDGER_PATH)
    #[arg(short, long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint a Proposal, anchor it in the ledger and print its wire text
    Propose {
        /// Proposal content
        #[arg(short, long)]
        content: String,
        /// Duration spec such as 12h, 3d or 90m (defaults to EC_DEFAULT_EXPIRY)
        #[arg(short, long)]
        expiry: Option<String>,
        /// Creation time instead of now, e.g. "Mon Jan 8 09:30:00 2024 +1000"
        #[arg(long)]
        at: Option<String>,
    },
    /// Print the RESPONSE block answering a Proposal
    Ballot {
        /// File holding the Proposal mail ("-" for stdin)
        proposal: PathBuf,
        /// yes or no
        #[arg(short, long)]
        choice: String,
    },
    /// Decode any wire block and print it as JSON
    Decode {
        /// File holding the mail ("-" for stdin)
        input: PathBuf,
    },
    /// Tally replies to an anchored Proposal and print the BUNDLE block
    Bundle {
        /// Proposal id
        #[arg(long)]
        id: String,
        /// A recipient's reply, as ADDRESS=FILE
        #[arg(long = "reply", value_name = "ADDRESS=FILE")]
        replies: Vec<String>,
        /// A recipient who did not answer
        #[arg(long = "absent", value_name = "ADDRESS")]
        absent: Vec<String>,
        /// When the replies were sent (defaults to now)
        #[arg(long)]
        received_at: Option<String>,
    },
    /// Audit a BUNDLE block against the ledger and record it
    Commit {
        /// File holding the Bundle mail ("-" for stdin)
        input: PathBuf,
    },
    /// Verify the ledger's hash chain
    Verify,
    /// List ledger blocks, or show one block as JSON
    Show {
        /// Block hash or Proposal id
        #[arg(long)]
        hash: Option<String>,
    },
}

fn init_tracing(config: &SessionConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SessionConfig::from_env();
    if let Some(path) = args.ledger {
        config.ledger_path = path;
    }
    init_tracing(&config);
    config.validate()?;

    let output = match args.command {
        Command::Propose {
            content,
            expiry,
            at,
        } => commands::propose(&config, &content, expiry.as_deref(), at.as_deref())?,
        Command::Ballot { proposal, choice } => commands::ballot(&proposal, &choice)?,
        Command::Decode { input } => commands::decode(&input)?,
        Command::Bundle {
            id,
            replies,
            absent,
            received_at,
        } => commands::bundle(&config, &id, &replies, &absent, received_at.as_deref())?,
        Command::Commit { input } => commands::commit(&config, &input)?,
        Command::Verify => commands::verify(&config)?,
        Command::Show { hash } => commands::show(&config, hash.as_deref())?,
    };
    println!("{}", output);
    Ok(())
}
