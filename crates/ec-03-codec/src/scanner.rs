//! # Line Scanner
//!
//! Mail clients wrap long lines, double spaces and prefix replies with `>`.
//! The scanner first reduces the whole body to a single space-separated line,
//! then finds block markers and labeled fields in that line. Every field value
//! therefore comes out with internal whitespace runs collapsed to one space.

use crate::errors::{DecodeError, MarkerEdge};
use shared_types::{BlockKind, HexHash, OffsetTimestamp};
use tracing::debug;

/// Drop reply-quote prefixes, then collapse all whitespace (line breaks
/// included) to single spaces.
pub fn normalize(text: &str) -> String {
    text.lines()
        .map(strip_quote_prefix)
        .flat_map(|line| line.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_quote_prefix(line: &str) -> &str {
    let mut rest = line.trim_start();
    while let Some(stripped) = rest.strip_prefix('>') {
        rest = stripped.trim_start();
    }
    rest
}

/// Text between the first START marker of `kind` and the END marker after it.
pub fn find_block(normalized: &str, kind: BlockKind) -> Result<&str, DecodeError> {
    let start = kind.start_marker();
    let end = kind.end_marker();

    let begin = normalized
        .find(&start)
        .map(|at| at + start.len())
        .ok_or_else(|| missing_marker(kind, MarkerEdge::Start))?;
    let length = normalized[begin..]
        .find(&end)
        .ok_or_else(|| missing_marker(kind, MarkerEdge::End))?;

    Ok(normalized[begin..begin + length].trim())
}

fn missing_marker(kind: BlockKind, edge: MarkerEdge) -> DecodeError {
    debug!("[ec-03] {} block: {} marker not found", kind, edge);
    DecodeError::MissingMarker { kind, edge }
}

/// Values of `labels`, which must appear in order as `# <label>` fields.
///
/// Each value runs from the end of its label to the start of the next
/// field, or to the end of the block for the last one.
pub fn scan_fields<'a, const N: usize>(
    body: &'a str,
    kind: BlockKind,
    labels: [&'static str; N],
) -> Result<[&'a str; N], DecodeError> {
    let needles = labels.map(|label| format!("# {}", label));
    let mut values = [""; N];

    if let Some(first) = needles.first() {
        if !body.starts_with(first.as_str()) {
            return Err(match body.find(first.as_str()) {
                Some(_) => DecodeError::UnexpectedText {
                    kind,
                    label: labels[0],
                },
                None => DecodeError::MissingField {
                    kind,
                    label: labels[0],
                },
            });
        }
    }

    let mut cursor = 0;
    for index in 0..N {
        let value_start = cursor + needles[index].len();
        let value_end = match needles.get(index + 1) {
            Some(next) => body[value_start..]
                .find(next.as_str())
                .map(|at| value_start + at)
                .ok_or(DecodeError::MissingField {
                    kind,
                    label: labels[index + 1],
                })?,
            None => body.len(),
        };

        let value = body[value_start..value_end].trim();
        if value.is_empty() {
            return Err(DecodeError::EmptyField {
                kind,
                label: labels[index],
            });
        }
        values[index] = value;
        cursor = value_end;
    }

    Ok(values)
}

/// One `# <label> <value>` line.
pub(crate) fn field_line(label: &str, value: &str) -> String {
    format!("# {} {}", label, value)
}

/// A field that must hold exactly 64 hex characters.
pub fn parse_id(label: &'static str, value: &str) -> Result<HexHash, DecodeError> {
    HexHash::parse(value).map_err(|_| DecodeError::MalformedId {
        label,
        value: value.to_string(),
    })
}

/// A field that must hold a timestamp in its canonical wire rendering.
pub fn parse_timestamp(label: &'static str, value: &str) -> Result<OffsetTimestamp, DecodeError> {
    let non_canonical = || DecodeError::NonCanonicalTimestamp {
        label,
        value: value.to_string(),
    };
    if !OffsetTimestamp::is_canonical(value) {
        return Err(non_canonical());
    }
    OffsetTimestamp::parse(value).map_err(|_| non_canonical())
}
