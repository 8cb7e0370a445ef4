// jgrep - core/signature_import.rs
//
// Signature JSON import (C10, ambient). Mirrors the "core never touches the
// filesystem directly" layering: this module only knows how to turn an
// already-read JSON string into a `SignatureTable`; the app layer (C11) owns
// the actual file read.

use crate::core::signature::{Signature, SignatureTable};
use crate::util::error::SignatureError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Raw JSON shape: `{ "<name>": { "Hex": "50 4B 03 04", "Offset": 0 } }`
/// (§3.1, §6.2).
#[derive(Debug, Deserialize)]
struct SignatureDef {
    #[serde(rename = "Hex")]
    hex: String,

    #[serde(rename = "Offset", default)]
    offset: u64,
}

/// Read `path` and build a `SignatureTable` from its contents. Thin wrapper
/// around [`parse_signature_table`] that owns the one piece of I/O.
pub fn load_signature_table(path: &Path) -> Result<SignatureTable, SignatureError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SignatureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_signature_table(&contents, path)
}

/// Pure parse/validate: JSON string in, `SignatureTable` out. No filesystem
/// access. `source_path` is retained only for error messages.
pub fn parse_signature_table(
    contents: &str,
    source_path: &Path,
) -> Result<SignatureTable, SignatureError> {
    let raw: HashMap<String, SignatureDef> =
        serde_json::from_str(contents).map_err(|source| SignatureError::Json {
            path: source_path.to_path_buf(),
            source,
        })?;

    let mut signatures = Vec::with_capacity(raw.len());
    for (name, def) in raw {
        let pattern = parse_hex(&name, &def.hex)?;
        signatures.push(Signature::new(name, pattern, def.offset as usize));
    }

    Ok(SignatureTable::new(signatures))
}

/// Convert a space-separated `Hex` string into a byte/wildcard pattern,
/// rejecting any token that is not exactly two hex digits or `??` (§4.9).
fn parse_hex(name: &str, hex: &str) -> Result<Vec<Option<u8>>, SignatureError> {
    let hex = hex.trim();
    if hex.is_empty() {
        return Ok(Vec::new());
    }

    hex.split_whitespace()
        .map(|token| {
            if token == "??" {
                Ok(None)
            } else if token.len() == 2 && token.chars().all(|c| c.is_ascii_hexdigit()) {
                u8::from_str_radix(token, 16)
                    .map(Some)
                    .map_err(|_| invalid_token(name, token))
            } else {
                Err(invalid_token(name, token))
            }
        })
        .collect()
}

fn invalid_token(name: &str, token: &str) -> SignatureError {
    SignatureError::InvalidHexToken {
        name: name.to_string(),
        token: token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zip_like_entry() {
        let json = r#"{"ZIP": {"Hex": "50 4B 03 04", "Offset": 0}}"#;
        let table = parse_signature_table(json, Path::new("sigs.json")).unwrap();
        let buf = [0x50, 0x4B, 0x03, 0x04];
        assert_eq!(table.classify(&buf, buf.len()), Some("ZIP"));
    }

    #[test]
    fn offset_defaults_to_zero_when_absent() {
        let json = r#"{"ZIP": {"Hex": "50 4B"}}"#;
        let table = parse_signature_table(json, Path::new("sigs.json")).unwrap();
        assert_eq!(table.get("ZIP").unwrap().offset, 0);
    }

    #[test]
    fn wildcard_token_parses_as_none() {
        let json = r#"{"RIFF": {"Hex": "52 49 46 46 ?? ?? ?? ??", "Offset": 0}}"#;
        let table = parse_signature_table(json, Path::new("sigs.json")).unwrap();
        let buf = [0x52, 0x49, 0x46, 0x46, 0xAA, 0xBB, 0xCC, 0xDD];
        assert_eq!(table.classify(&buf, buf.len()), Some("RIFF"));
    }

    #[test]
    fn invalid_token_is_rejected() {
        let json = r#"{"BAD": {"Hex": "ZZ", "Offset": 0}}"#;
        let err = parse_signature_table(json, Path::new("sigs.json")).unwrap_err();
        match err {
            SignatureError::InvalidHexToken { name, token } => {
                assert_eq!(name, "BAD");
                assert_eq!(token, "ZZ");
            }
            other => panic!("expected InvalidHexToken, got {other:?}"),
        }
    }

    #[test]
    fn empty_table_is_valid() {
        let table = parse_signature_table("{}", Path::new("sigs.json")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn malformed_json_surfaces_json_error() {
        let err = parse_signature_table("not json", Path::new("sigs.json")).unwrap_err();
        matches!(err, SignatureError::Json { .. });
    }
}
