//! Content canonicalization for the constructive path.

use super::errors::IdentityError;
use shared_types::wire::find_reserved_phrase;
use tracing::debug;

/// Collapse every whitespace run (line breaks included) to one space and trim.
///
/// Decoding normalizes field values the same way, so canonical content
/// survives encode then decode unchanged and its id recomputes.
pub fn canonicalize_content(raw: &str) -> Result<String, IdentityError> {
    let canonical = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if canonical.is_empty() {
        return Err(IdentityError::InvalidContent {
            reason: "content is empty".to_string(),
        });
    }
    if let Some(phrase) = find_reserved_phrase(&canonical) {
        debug!("[ec-01] content rejected: contains {:?}", phrase);
        return Err(IdentityError::InvalidContent {
            reason: format!("content contains the wire label {:?}", phrase),
        });
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_line_breaks_and_runs() {
        let canonical = canonicalize_content("  Buy the\r\nnew   printer\t").unwrap();
        assert_eq!(canonical, "Buy the new printer");
    }

    #[test]
    fn test_rejects_blank_content() {
        assert!(matches!(
            canonicalize_content(" \n\t "),
            Err(IdentityError::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_rejects_wire_labels() {
        let err = canonicalize_content("Please see # MESSAGE ID: 1234").unwrap_err();
        assert!(err.to_string().contains("MESSAGE ID:"));
    }
}
