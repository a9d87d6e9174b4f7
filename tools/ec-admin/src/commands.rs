//! Command implementations. Each returns the text to print.

use anyhow::{bail, Context, Result};
use ec_01_identity::mint_proposal;
use ec_02_expiry_clock::{DurationSpec, ExpiryClock, ExpiryWindow, SystemTimeSource};
use ec_03_codec::{
    decode_ballot, decode_bundle, decode_proposal, encode_ballot, encode_bundle, encode_proposal,
    CodecError, DecodeError, MarkerEdge,
};
use ec_06_ledger::{FileLedgerStore, Ledger, LedgerEntry};
use ec_07_session::{reconstruct_bundle, BallotRound, SessionConfig};
use shared_types::{ActionKind, Ballot, Choice, HexHash, OffsetTimestamp};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn open_ledger(config: &SessionConfig) -> Result<Ledger<FileLedgerStore>> {
    Ledger::open(FileLedgerStore::new(&config.ledger_path))
        .with_context(|| format!("Failed to open ledger {}", config.ledger_path.display()))
}

fn now() -> OffsetTimestamp {
    ExpiryClock::new(SystemTimeSource).now()
}

pub fn propose(
    config: &SessionConfig,
    content: &str,
    expiry: Option<&str>,
    at: Option<&str>,
) -> Result<String> {
    let spec: DurationSpec = match expiry {
        Some(expiry) => expiry.parse()?,
        None => config.default_expiry_spec()?,
    };
    let window = match at {
        Some(at) => ExpiryWindow::starting_at(OffsetTimestamp::parse(at)?, spec)?,
        None => ExpiryClock::new(SystemTimeSource).open_window(spec)?,
    };

    let proposal = mint_proposal(
        content,
        ActionKind::Approval,
        window.created_at(),
        window.expires_at(),
    )?;
    let len = proposal.content().chars().count();
    if len < config.min_content_len {
        bail!(
            "Content is {} characters, minimum is {}",
            len,
            config.min_content_len
        );
    }

    let ledger = open_ledger(config)?;
    let block = ledger
        .append(LedgerEntry::Proposal(proposal.clone()))
        .context("Failed to anchor proposal")?;
    info!(
        "Proposal {} anchored at block {} 💾",
        proposal.id().short(),
        block.index
    );
    Ok(encode_proposal(&proposal))
}

pub fn ballot(proposal: &Path, choice: &str) -> Result<String> {
    let proposal = decode_proposal(&read_input(proposal)?).context("Not a valid proposal")?;
    let choice: Choice = choice.parse()?;
    Ok(encode_ballot(&Ballot::new(
        proposal.id().clone(),
        proposal.action().response_for(choice),
    )))
}

fn missing_start(err: &DecodeError) -> bool {
    matches!(
        err,
        DecodeError::MissingMarker {
            edge: MarkerEdge::Start,
            ..
        }
    )
}

/// Decode whichever block the mail carries. A Proposal mail also carries a
/// RESPONSE template, so REQUEST is tried before RESPONSE.
pub fn decode(input: &Path) -> Result<String> {
    let text = read_input(input)?;

    match decode_bundle(&text) {
        Ok(wire) => {
            let value = serde_json::json!({
                "proposalId": wire.proposal_id,
                "content": wire.content,
                "action": wire.action,
                "ballotsByRecipient": wire.slots,
                "verdict": wire.claimed_verdict,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }
        Err(e) if !missing_start(&e) => return Err(e).context("Not a valid bundle"),
        Err(_) => {}
    }

    match decode_proposal(&text) {
        Ok(proposal) => return Ok(serde_json::to_string_pretty(&proposal)?),
        Err(CodecError::Decode(e)) if missing_start(&e) => {}
        Err(e) => return Err(e).context("Not a valid proposal"),
    }

    let ballot = decode_ballot(&text).context("No proposal, ballot or bundle found")?;
    Ok(serde_json::to_string_pretty(&ballot)?)
}

pub fn bundle(
    config: &SessionConfig,
    id: &str,
    replies: &[String],
    absent: &[String],
    received_at: Option<&str>,
) -> Result<String> {
    let ledger = open_ledger(config)?;
    let id = HexHash::parse(id)?;
    let proposal = ledger
        .find_proposal(&id)
        .with_context(|| format!("Proposal {} is not in the ledger", id))?;

    let replies = replies
        .iter()
        .map(|reply| {
            reply
                .split_once('=')
                .with_context(|| format!("Expected ADDRESS=FILE, got {:?}", reply))
        })
        .collect::<Result<Vec<_>>>()?;
    let received_at = match received_at {
        Some(at) => OffsetTimestamp::parse(at)?,
        None => now(),
    };

    let recipients = replies
        .iter()
        .map(|(address, _)| *address)
        .chain(absent.iter().map(String::as_str));
    let mut round = BallotRound::new(proposal, recipients);
    for (address, path) in &replies {
        let body = read_input(Path::new(path))?;
        let outcome = round.record_reply(address, &received_at, &body);
        if !outcome.changed_slot() {
            warn!("Reply from {} not counted: {:?}", address, outcome);
        }
    }
    for address in absent {
        round.mark_absent(address)?;
    }

    let bundle = round.close()?;
    info!(
        "Bundle for {} tallied: {}",
        bundle.proposal().id().short(),
        bundle.verdict()
    );
    Ok(encode_bundle(&bundle)?)
}

pub fn commit(config: &SessionConfig, input: &Path) -> Result<String> {
    let ledger = open_ledger(config)?;
    let bundle = reconstruct_bundle(&read_input(input)?, &ledger).context("Bundle failed audit")?;
    let verdict = bundle.verdict();
    let id = bundle.proposal().id().clone();
    let block = ledger
        .append(LedgerEntry::Bundle(bundle))
        .context("Failed to record bundle")?;
    Ok(format!(
        "Bundle for {} ({}) recorded at block {}",
        id, verdict, block.index
    ))
}

pub fn verify(config: &SessionConfig) -> Result<String> {
    let ledger = open_ledger(config)?;
    if !ledger.verify_chain() {
        bail!("Ledger {} failed verification", config.ledger_path.display());
    }
    Ok(format!(
        "Ledger {} verified: {} blocks, head {}",
        config.ledger_path.display(),
        ledger.len(),
        ledger.head_hash()
    ))
}

pub fn show(config: &SessionConfig, hash: Option<&str>) -> Result<String> {
    let ledger = open_ledger(config)?;
    match hash {
        Some(hash) => {
            let block = ledger.find_by_hash(&HexHash::parse(hash)?)?;
            Ok(serde_json::to_string_pretty(&block)?)
        }
        None => Ok(ledger
            .blocks()
            .iter()
            .map(|block| {
                format!(
                    "{:>4}  {:<8}  {}  {}",
                    block.index,
                    block.kind.to_string(),
                    block.payload.proposal_id(),
                    block.own_hash.short()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
