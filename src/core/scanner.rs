// jgrep - core/scanner.rs
//
// Per-file scan pipeline (C6): existence check -> binary filter -> encoding
// resolution -> line-oriented regex match -> formatted emission.

use crate::core::classifier;
use crate::core::encoding::{self};
use crate::core::model::{CodepageMode, MatchRecord, ScanConfig};
use crate::platform::fs::{read_prefix, read_range};
use crate::util::error::ScanFileError;
use std::fs;
use std::path::Path;

/// Scan one file against `config`, returning the records it produced.
///
/// Every failure mode named in §7 for C2/C3/C6 (`FileNotFound`, `FileIOError`,
/// `DecodeError`) is handled locally: this function never returns an `Err`
/// for a condition the spec classifies as per-file-recoverable. It only
/// surfaces an error when the file genuinely cannot be reasoned about at all
/// (reserved for future catastrophic cases; currently always `Ok`).
pub fn scan_file(path: &Path, config: &ScanConfig) -> Result<Vec<MatchRecord>, ScanFileError> {
    if !path.exists() {
        return Err(ScanFileError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if config.text_only {
        match classifier::classify(path, &config.signatures) {
            Ok(Some(_name)) => return Ok(Vec::new()),
            Ok(None) => {}
            Err(source) => {
                return Err(ScanFileError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    let meta = fs::metadata(path).map_err(|source| ScanFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_len = meta.len();

    let key = match config.codepage {
        CodepageMode::Fixed(key) => key,
        CodepageMode::Auto => {
            let sample = encoding::assemble_sample(file_len, |offset, len| {
                if offset == 0 {
                    read_prefix(path, len)
                } else {
                    read_range(path, offset, len)
                }
            })
            .map_err(|source| ScanFileError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            encoding::detect(&sample)
        }
    };

    let whole = fs::read(path).map_err(|source| ScanFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let body = &whole[encoding::bom_len(key).min(whole.len())..];
    let text = encoding::decode_lossy(key, body);
    let display_name = encoding::info(key).display_name;

    let mut records = Vec::new();
    for (idx, line) in split_lines(&text).enumerate() {
        let line_number = (idx + 1) as u64;
        if let Some(m) = config.regex.find(line) {
            let column_number = (line[..m.start()].chars().count() + 1) as u64;
            let payload = if config.output_matched_part {
                m.as_str().to_string()
            } else {
                line.to_string()
            };
            records.push(MatchRecord {
                file_path: path.to_path_buf(),
                line_number,
                column_number,
                encoding_display_name: display_name.to_string(),
                payload,
            });
            if config.first_match_only {
                break;
            }
        }
    }

    Ok(records)
}

/// Split decoded text on CR, LF, or CRLF, stripping the terminator, the way
/// the registry's decoders are specified to behave (§4.3).
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if i < bytes.len() && bytes[i] == b'\n' {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::CodepageMode;
    use crate::core::pattern::{compile, CompileOptions};
    use crate::core::signature::SignatureTable;
    use std::sync::Arc;
    use std::time::Instant;

    fn config(pattern: &str, text_only: bool, first_match_only: bool) -> ScanConfig {
        ScanConfig {
            regex: compile(pattern, CompileOptions::default()).unwrap(),
            text_only,
            signatures: Arc::new(SignatureTable::builtin()),
            codepage: CodepageMode::Auto,
            first_match_only,
            output_matched_part: false,
            parallelism: 1,
            quiet: true,
            debug: false,
            start_time: Instant::now(),
        }
    }

    #[test]
    fn plain_ascii_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello\nworld\n").unwrap();

        let cfg = config("world", false, false);
        let records = scan_file(&path, &cfg).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_number, 2);
        assert_eq!(records[0].column_number, 1);
        assert_eq!(records[0].encoding_display_name, "ASCII");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let cfg = config("x", false, false);
        let err = scan_file(&path, &cfg).unwrap_err();
        matches!(err, ScanFileError::NotFound { .. });
    }

    #[test]
    fn binary_file_skipped_when_text_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        std::fs::write(&path, [0x50, 0x4B, 0x03, 0x04, b'P', b'K']).unwrap();

        let cfg = config("PK", true, false);
        let records = scan_file(&path, &cfg).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn first_match_only_stops_after_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.log");
        std::fs::write(&path, "ERROR one\nERROR two\nERROR three\n").unwrap();

        let cfg = config("ERROR", false, true);
        let records = scan_file(&path, &cfg).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_number, 1);
    }

    #[test]
    fn utf8_bom_match_reports_utf8_display_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.txt");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("あいうerror\n".as_bytes());
        std::fs::write(&path, &bytes).unwrap();

        let cfg = config("error", false, false);
        let records = scan_file(&path, &cfg).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].encoding_display_name, "UTF-8");
        assert_eq!(records[0].column_number, 4);
    }
}
